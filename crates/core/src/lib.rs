//! vrworld-core: location metadata model and on-chain resolution
//!
//! This crate holds the data model returned by `GET /world/{location_id}`,
//! a small ABI codec for the location contract, and the resolver that
//! turns an identifier into metadata through a [`ContractCaller`].

pub mod abi;
pub mod error;
pub mod location;
pub mod resolver;

pub use abi::{AbiError, Method, ParamType, Token, decode_hex, decode_revert_reason};
pub use error::ChainError;
pub use location::{
    ErrorBody, LocationId, LocationMetadata, LocationRecord, LocationResponse, ResolutionResult,
};
pub use resolver::{ContractCaller, GET_LOCATION, MetadataResolver};
