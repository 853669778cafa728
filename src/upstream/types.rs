//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Every request carries the same id; one request is in flight per connection use.
pub const REQUEST_ID: u32 = 1;

pub const METHOD_GET_BALANCE: &str = "eth_getBalance";
pub const METHOD_CLIENT_VERSION: &str = "web3_clientVersion";

/// Block tag used for balance queries.
pub const LATEST_BLOCK: &str = "latest";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u32,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: REQUEST_ID,
        }
    }

    /// `eth_getBalance` for `address` at the latest block.
    pub fn get_balance(address: &str) -> Self {
        Self::new(
            METHOD_GET_BALANCE,
            vec![Value::from(address), Value::from(LATEST_BLOCK)],
        )
    }

    /// Lightweight liveness call.
    pub fn client_version() -> Self {
        Self::new(METHOD_CLIENT_VERSION, Vec::new())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}
