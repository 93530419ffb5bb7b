//! Mock TDEX provider for integration tests.
//!
//! An axum server on an ephemeral port that:
//! - Answers every POST/GET path from a table of canned replies
//! - Keys `/v2/market/price` replies by base asset
//! - Records every request body

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<String, (StatusCode, Value)>>,
    requests: Mutex<Vec<(String, Value)>>,
}

/// A mock provider server.
pub struct MockProvider {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockProvider {
    /// Start a new mock provider on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState::default());

        let app = Router::new().fallback(handle).with_state(state.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle: task,
        }
    }

    /// Base URL, usable as a provider endpoint.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Reply to `path` with `status` and `body`.
    pub fn set(&self, path: &str, status: StatusCode, body: Value) {
        self.state
            .replies
            .lock()
            .insert(path.to_string(), (status, body));
    }

    /// Reply 200 to `path` with `body`.
    pub fn ok(&self, path: &str, body: Value) {
        self.set(path, StatusCode::OK, body);
    }

    /// Reply to `/v2/market/price` for the market with `base_asset`.
    pub fn price(&self, base_asset: &str, spot: f64, base_amount: &str, quote_amount: &str) {
        self.ok(
            &format!("/v2/market/price:{base_asset}"),
            json!({
                "spotPrice": spot,
                "minTradableAmount": "5000",
                "balance": {"baseAmount": base_amount, "quoteAmount": quote_amount}
            }),
        );
    }

    /// Serve `markets` as `{baseAsset, quoteAsset}` pairs with the given fees.
    pub fn markets(&self, markets: &[(&str, &str)], percentage_bps: &str, fixed: &str) {
        let entries: Vec<Value> = markets
            .iter()
            .map(|(base, quote)| {
                json!({
                    "market": {"baseAsset": base, "quoteAsset": quote},
                    "fee": {
                        "percentageFee": {"baseAsset": percentage_bps, "quoteAsset": percentage_bps},
                        "fixedFee": {"baseAsset": fixed, "quoteAsset": fixed}
                    }
                })
            })
            .collect();
        self.ok("/v2/markets", json!({ "markets": entries }));
    }

    /// Requests received on `path`.
    pub fn requests(&self, path: &str) -> Vec<Value> {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(State(state): State<Arc<MockState>>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().push((path.clone(), body.clone()));

    let replies = state.replies.lock();
    let keyed = body
        .pointer("/market/baseAsset")
        .and_then(Value::as_str)
        .and_then(|base| replies.get(&format!("{path}:{base}")));

    match keyed.or_else(|| replies.get(&path)) {
        Some((status, reply)) => (*status, Json(reply.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
