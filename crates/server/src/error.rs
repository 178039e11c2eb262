//! Startup error handling

use thiserror::Error;
use vrworld_core::ChainError;

use crate::config::ConfigError;
use crate::vr::VrError;

/// Errors that abort process startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("blockchain provider error: {0}")]
    Chain(#[from] ChainError),

    #[error("VR bootstrap failed: {0}")]
    Vr(#[from] VrError),

    #[error("invalid bind address {address}: {reason}")]
    BindAddress { address: String, reason: String },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
