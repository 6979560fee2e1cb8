//! JSON-RPC transport to the development chain

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use solgen_core::{Result, SolgenError};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

/// Trait for issuing JSON-RPC calls (allows mocking in tests)
#[async_trait]
pub trait EthRpc: Send + Sync {
    /// Issue one JSON-RPC call and return its `result` value
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// HTTP JSON-RPC client
#[derive(Debug, Clone)]
pub struct HttpRpc {
    url: String,
    client: reqwest::Client,
}

impl HttpRpc {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EthRpc for HttpRpc {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!("rpc call {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SolgenError::NodeUnreachable(format!(
                        "cannot reach {} ({}); start a development chain, e.g. `anvil` or `ganache`",
                        self.url, e
                    ))
                } else {
                    SolgenError::Rpc(format!("{} request failed: {}", method, e))
                }
            })?;

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| SolgenError::Rpc(format!("unreadable {} response: {}", method, e)))?;

        if let Some(error) = envelope.error {
            return Err(SolgenError::Rpc(format!(
                "{} rejected: {} (code {})",
                method, error.message, error.code
            )));
        }

        envelope
            .result
            .ok_or_else(|| SolgenError::Rpc(format!("{} returned no result", method)))
    }
}

/// Mock RPC transport for testing
///
/// Responses are queued per method and consumed in order, so receipt polling
/// can be scripted as a run of nulls followed by the mined receipt.
#[derive(Default)]
pub struct MockRpc {
    responses: Mutex<HashMap<String, VecDeque<Value>>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method`
    pub fn with_response(self, method: &str, response: Value) -> Self {
        {
            let mut responses = self.responses.lock().unwrap();
            responses
                .entry(method.to_string())
                .or_default()
                .push_back(response);
        }
        self
    }
}

#[async_trait]
impl EthRpc for MockRpc {
    async fn call(&self, method: &str, _params: Value) -> Result<Value> {
        let mut responses = self.responses.lock().unwrap();
        responses
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| SolgenError::Rpc(format!("no mock response for: {}", method)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_responses_consume_in_order() {
        let rpc = MockRpc::new()
            .with_response("eth_getTransactionReceipt", Value::Null)
            .with_response(
                "eth_getTransactionReceipt",
                serde_json::json!({"contractAddress": "0xabc"}),
            );

        let first = rpc
            .call("eth_getTransactionReceipt", serde_json::json!([]))
            .await
            .unwrap();
        assert!(first.is_null());

        let second = rpc
            .call("eth_getTransactionReceipt", serde_json::json!([]))
            .await
            .unwrap();
        assert_eq!(second["contractAddress"], "0xabc");

        let exhausted = rpc
            .call("eth_getTransactionReceipt", serde_json::json!([]))
            .await;
        assert!(exhausted.is_err());
    }

    #[test]
    fn test_error_envelope_parses() {
        let raw = r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "revert"}}"#;
        let envelope: RpcEnvelope = serde_json::from_str(raw).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "revert");
    }
}
