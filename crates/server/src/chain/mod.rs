//! Blockchain provider access

pub mod client;

pub use client::EthClient;
