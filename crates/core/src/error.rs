use crate::abi::AbiError;
use std::time::Duration;
use thiserror::Error;

/// Failures of an outbound contract call.
///
/// All variants collapse into `ResolutionResult::Failure` carrying the
/// `Display` text, so messages are written to be shown to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("chain call timed out after {0:?}")]
    Timeout(Duration),

    /// JSON-RPC error object returned by the node; its message is kept verbatim.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("invalid contract call arguments: {0}")]
    Encode(AbiError),

    #[error("failed to decode contract response: {0}")]
    Decode(#[from] AbiError),

    #[error("unknown contract method: {0}")]
    UnknownMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_displays_node_message() {
        let err = ChainError::Rpc {
            code: 3,
            message: "execution reverted: unknown location".to_string(),
        };
        assert_eq!(err.to_string(), "execution reverted: unknown location");
    }

    #[test]
    fn reverted_and_timeout_messages() {
        assert_eq!(
            ChainError::Reverted("unknown location".into()).to_string(),
            "execution reverted: unknown location"
        );
        assert_eq!(
            ChainError::Timeout(Duration::from_millis(1500)).to_string(),
            "chain call timed out after 1.5s"
        );
    }

    #[test]
    fn encode_errors_blame_the_arguments() {
        let err = ChainError::Encode(AbiError::ArgumentCount {
            expected: 1,
            actual: 0,
        });
        assert_eq!(
            err.to_string(),
            "invalid contract call arguments: expected 1 arguments, got 0"
        );
    }

    #[test]
    fn abi_errors_convert() {
        let err: ChainError = AbiError::EmptyData.into();
        assert_eq!(
            err.to_string(),
            "failed to decode contract response: empty return data"
        );
    }
}
