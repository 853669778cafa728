//! Shared utilities for integration tests.
//!
//! Mock Ethereum nodes are small axum servers on ephemeral loopback ports.
//! Their reply can be reprogrammed while running, and they count balance
//! and probe calls separately.
#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use eth_proxy::config::{NodeConfig, ProxyConfig, UpstreamConfig};
use eth_proxy::load_balancer::NodePool;
use eth_proxy::upstream::UpstreamClient;
use eth_proxy::{BalanceService, QueryPolicy};

/// What a mock node answers to `eth_getBalance`.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `{"result": <hex>}`
    Balance(String),
    /// `{"error": {"code", "message"}}` with HTTP 200.
    RpcError(i64, String),
    /// Bare HTTP status with an empty body. Probes get the same status.
    Status(u16),
    /// HTTP 200 with a body that is not JSON.
    Garbage,
    /// Sleep, then answer with the inner reply.
    Delayed(Duration, Box<Reply>),
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Mutex<Reply>>,
    balance_calls: Arc<AtomicU32>,
    probe_calls: Arc<AtomicU32>,
}

pub struct MockNode {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockNode {
    pub async fn start(reply: Reply) -> Self {
        let state = MockState {
            reply: Arc::new(Mutex::new(reply)),
            balance_calls: Arc::new(AtomicU32::new(0)),
            probe_calls: Arc::new(AtomicU32::new(0)),
        };

        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    pub fn balance_calls(&self) -> u32 {
        self.state.balance_calls.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> u32 {
        self.state.probe_calls.load(Ordering::SeqCst)
    }
}

async fn handle_rpc(State(state): State<MockState>, Json(request): Json<Value>) -> Response {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let reply = state.reply.lock().unwrap().clone();

    if method == "web3_clientVersion" {
        state.probe_calls.fetch_add(1, Ordering::SeqCst);
        return match reply {
            Reply::Status(code) => status_only(code),
            _ => Json(json!({"jsonrpc": "2.0", "id": id, "result": "MockNode/v1.0.0"})).into_response(),
        };
    }

    state.balance_calls.fetch_add(1, Ordering::SeqCst);
    let reply = match reply {
        Reply::Delayed(delay, inner) => {
            tokio::time::sleep(delay).await;
            *inner
        }
        other => other,
    };

    match reply {
        Reply::Balance(hex) => Json(json!({"jsonrpc": "2.0", "id": id, "result": hex})).into_response(),
        Reply::RpcError(code, message) => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message}
        }))
        .into_response(),
        Reply::Status(code) => status_only(code),
        Reply::Garbage => (StatusCode::OK, "<html>bad gateway</html>").into_response(),
        Reply::Delayed(..) => status_only(500),
    }
}

fn status_only(code: u16) -> Response {
    StatusCode::from_u16(code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

/// Node configs named `node-0`, `node-1`, ... in the given order.
pub fn node_configs(nodes: &[&MockNode]) -> Vec<NodeConfig> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| NodeConfig::new(format!("node-{}", i), node.url()))
        .collect()
}

pub fn client() -> UpstreamClient {
    UpstreamClient::new(&UpstreamConfig {
        client_timeout_secs: 5,
        ..UpstreamConfig::default()
    })
    .unwrap()
}

/// Balance service over the given mock nodes with a default failure threshold.
pub fn service(nodes: &[&MockNode], policy: QueryPolicy) -> BalanceService {
    let pool = Arc::new(NodePool::from_config(&node_configs(nodes), 3));
    BalanceService::new(pool, client(), policy)
}

/// Full proxy config over the given mock nodes. Health checks are off
/// unless a test turns them on.
pub fn proxy_config(nodes: &[&MockNode]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.nodes = node_configs(nodes);
    config.health_check.enabled = false;
    config.upstream.client_timeout_secs = 5;
    config
}

/// Poll `condition` every 20ms until it holds or `limit` elapses.
pub async fn wait_until<F>(limit: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}
