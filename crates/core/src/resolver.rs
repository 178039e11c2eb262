//! Location metadata resolution against the contract

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::abi::{AbiError, Token};
use crate::error::ChainError;
use crate::location::{LocationId, LocationMetadata, ResolutionResult};

/// Name of the read-only contract method backing resolution
pub const GET_LOCATION: &str = "getLocation";

/// Read-only access to a deployed contract through a provider.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Call a contract method by name and return its decoded outputs.
    async fn call_contract_method(
        &self,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>, ChainError>;

    /// Check that the provider is reachable.
    async fn is_connected(&self) -> Result<(), ChainError>;
}

/// Resolves location identifiers into metadata.
///
/// Holds no mutable state; clones share the same caller.
#[derive(Clone)]
pub struct MetadataResolver {
    caller: Arc<dyn ContractCaller>,
    timeout: Duration,
}

impl MetadataResolver {
    pub fn new(caller: Arc<dyn ContractCaller>, timeout: Duration) -> Self {
        Self { caller, timeout }
    }

    pub fn caller(&self) -> &Arc<dyn ContractCaller> {
        &self.caller
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a location with a single bounded call. Never fails; errors
    /// become `ResolutionResult::Failure`.
    pub async fn resolve(&self, location_id: &LocationId) -> ResolutionResult {
        match self.fetch(location_id).await {
            Ok(metadata) => {
                tracing::debug!(location_id = %location_id, name = %metadata.name, "Location resolved");
                metrics::counter!("location_resolutions_total", "outcome" => "success").increment(1);
                ResolutionResult::Success(metadata)
            }
            Err(e) => {
                tracing::warn!(location_id = %location_id, error = %e, "Location resolution failed");
                metrics::counter!("location_resolutions_total", "outcome" => "failure").increment(1);
                ResolutionResult::Failure(e.to_string())
            }
        }
    }

    async fn fetch(&self, location_id: &LocationId) -> Result<LocationMetadata, ChainError> {
        let args = vec![Token::String(location_id.as_str().to_string())];
        let tokens = tokio::time::timeout(
            self.timeout,
            self.caller.call_contract_method(GET_LOCATION, args),
        )
        .await
        .map_err(|_| ChainError::Timeout(self.timeout))??;

        metadata_from_tokens(tokens)
    }
}

/// Map the positional `(name, description, owner)` output into named fields.
fn metadata_from_tokens(tokens: Vec<Token>) -> Result<LocationMetadata, ChainError> {
    let [name, description, owner]: [Token; 3] = tokens.try_into().map_err(|t: Vec<Token>| {
        ChainError::Decode(AbiError::ArgumentCount {
            expected: 3,
            actual: t.len(),
        })
    })?;

    Ok(LocationMetadata {
        name: name.into_string(),
        description: description.into_string(),
        owner: owner.into_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Caller returning a canned response and recording its arguments
    struct FakeCaller {
        response: Result<Vec<Token>, ChainError>,
        delay: Duration,
        calls: Mutex<Vec<(String, Vec<Token>)>>,
    }

    impl FakeCaller {
        fn new(response: Result<Vec<Token>, ChainError>) -> Self {
            Self {
                response,
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ContractCaller for FakeCaller {
        async fn call_contract_method(
            &self,
            method: &str,
            args: Vec<Token>,
        ) -> Result<Vec<Token>, ChainError> {
            self.calls.lock().unwrap().push((method.to_string(), args));
            tokio::time::sleep(self.delay).await;
            self.response.clone()
        }

        async fn is_connected(&self) -> Result<(), ChainError> {
            Ok(())
        }
    }

    fn triple(name: &str, description: &str, owner: &str) -> Vec<Token> {
        vec![
            Token::String(name.to_string()),
            Token::String(description.to_string()),
            Token::String(owner.to_string()),
        ]
    }

    fn resolver(caller: Arc<FakeCaller>) -> MetadataResolver {
        MetadataResolver::new(caller, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn maps_positions_to_fields() {
        let caller = Arc::new(FakeCaller::new(Ok(triple(
            "Forest Grove",
            "A peaceful clearing",
            "0xABC...123",
        ))));
        let result = resolver(caller.clone()).resolve(&"42".into()).await;

        assert_eq!(
            result,
            ResolutionResult::Success(LocationMetadata {
                name: "Forest Grove".to_string(),
                description: "A peaceful clearing".to_string(),
                owner: "0xABC...123".to_string(),
            })
        );

        let calls = caller.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "getLocation");
        assert_eq!(calls[0].1, vec![Token::String("42".to_string())]);
    }

    #[tokio::test]
    async fn forwards_empty_identifier() {
        let caller = Arc::new(FakeCaller::new(Ok(triple("a", "b", "c"))));
        let result = resolver(caller.clone()).resolve(&LocationId::new("")).await;

        assert!(result.is_success());
        assert_eq!(
            caller.calls.lock().unwrap()[0].1,
            vec![Token::String(String::new())]
        );
    }

    #[tokio::test]
    async fn converts_errors_to_failure_with_single_attempt() {
        let caller = Arc::new(FakeCaller::new(Err(ChainError::Rpc {
            code: 3,
            message: "execution reverted: unknown location".to_string(),
        })));
        let result = resolver(caller.clone())
            .resolve(&"doesnotexist".into())
            .await;

        assert_eq!(
            result,
            ResolutionResult::Failure("execution reverted: unknown location".to_string())
        );
        assert_eq!(caller.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn times_out_slow_calls() {
        let mut caller = FakeCaller::new(Ok(triple("a", "b", "c")));
        caller.delay = Duration::from_secs(5);
        let resolver = MetadataResolver::new(Arc::new(caller), Duration::from_millis(20));

        match resolver.resolve(&"42".into()).await {
            ResolutionResult::Failure(msg) => assert!(msg.contains("timed out"), "{msg}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_arity_is_a_decode_failure() {
        let caller = Arc::new(FakeCaller::new(Ok(vec![Token::String("only".into())])));
        match resolver(caller).resolve(&"1".into()).await {
            ResolutionResult::Failure(msg) => {
                assert!(msg.starts_with("failed to decode contract response"), "{msg}")
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn repeated_resolutions_are_identical() {
        let caller = Arc::new(FakeCaller::new(Ok(triple("a", "b", "0x1"))));
        let resolver = resolver(caller);
        let first = resolver.resolve(&"7".into()).await;
        let second = resolver.resolve(&"7".into()).await;
        assert_eq!(first, second);
    }
}
