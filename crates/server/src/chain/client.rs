//! Ethereum JSON-RPC client for read-only contract calls

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value as JsonValue, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use vrworld_core::{
    ChainError, ContractCaller, Method, Token, abi::decode_hex, abi::decode_revert_reason,
};

/// Client for a JSON-RPC node, bound to one contract
pub struct EthClient {
    http: reqwest::Client,
    node_url: String,
    contract: [u8; 20],
    methods: Vec<Method>,
    timeout: Duration,
    next_id: AtomicU64,
}

/// JSON-RPC 2.0 request envelope
#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: JsonValue,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<JsonValue>,
}

impl RpcErrorObject {
    fn into_chain_error(self) -> ChainError {
        let reason = self
            .data
            .as_ref()
            .and_then(JsonValue::as_str)
            .and_then(|hex| decode_hex(hex).ok())
            .and_then(|bytes| decode_revert_reason(&bytes));

        // Some nodes report a bare "execution reverted" and leave the reason in `data`
        let message = self.message.trim();
        match reason {
            Some(reason) if message.is_empty() || message == "execution reverted" => {
                ChainError::Reverted(reason)
            }
            _ if message.is_empty() => ChainError::Rpc {
                code: self.code,
                message: format!("JSON-RPC error {}", self.code),
            },
            _ => ChainError::Rpc {
                code: self.code,
                message: self.message,
            },
        }
    }
}

impl EthClient {
    /// Create a client for `contract` exposing the location contract interface.
    ///
    /// `timeout` bounds each HTTP round trip to the node.
    pub fn new(node_url: &str, contract: [u8; 20], timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            node_url: node_url.to_string(),
            contract,
            methods: vec![Method::get_location()],
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Chain id reported by the node (`eth_chainId`)
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        u64::from_str_radix(digits, 16)
            .map_err(|e| ChainError::Transport(format!("invalid chain id {:?}: {}", raw, e)))
    }

    /// Send a JSON-RPC request and return its `result`
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: JsonValue,
    ) -> Result<T, ChainError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.node_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Transport(format!(
                "node returned {}: {}",
                status, body
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        match (body.result, body.error) {
            (_, Some(error)) => Err(error.into_chain_error()),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ChainError::Transport(format!(
                "{} response has neither result nor error",
                method
            ))),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ChainError {
        if err.is_timeout() {
            ChainError::Timeout(self.timeout)
        } else {
            ChainError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ContractCaller for EthClient {
    async fn call_contract_method(
        &self,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>, ChainError> {
        let method = self
            .methods
            .iter()
            .find(|m| m.name == method)
            .ok_or_else(|| ChainError::UnknownMethod(method.to_string()))?;

        let calldata = method.encode_call(&args).map_err(ChainError::Encode)?;
        let params = json!([
            {
                "to": format!("0x{}", hex::encode(self.contract)),
                "data": format!("0x{}", hex::encode(calldata)),
            },
            "latest"
        ]);

        tracing::debug!(method = %method.name, node = %self.node_url, "eth_call");
        let raw: String = self.request("eth_call", params).await?;
        let data = decode_hex(&raw)?;
        Ok(method.decode_output(&data)?)
    }

    async fn is_connected(&self) -> Result<(), ChainError> {
        self.chain_id().await.map(|_| ())
    }
}
