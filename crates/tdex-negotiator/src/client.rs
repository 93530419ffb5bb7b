//! Transport for the provider trade endpoints.
//!
//! `TradeTransport` abstracts the JSON POST so negotiation can run against
//! an in-memory mock. `HttpTransport` is the reqwest implementation.

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tdex_core::validate::validate_provider_error;
use tdex_core::{Provider, ProviderErrorBody};
use tracing::debug;

use crate::error::{NegotiationError, NegotiationResult};

pub const PREVIEW_PATH: &str = "/v2/trade/preview";
pub const PROPOSE_PATH: &str = "/v2/trade/propose";
pub const COMPLETE_PATH: &str = "/v2/trade/complete";

/// Default timeout for trade requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a trade call produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The provider answered with an error body `{code, message}`.
    Rejected(ProviderErrorBody),
    /// No answer, or an answer that is not a provider error body.
    Unreachable(String),
}

/// JSON POST to a provider endpoint.
pub trait TradeTransport: Send + Sync {
    fn post<'a>(
        &'a self,
        provider: &'a Provider,
        path: &'static str,
        body: Value,
    ) -> BoxFuture<'a, Result<Value, TransportError>>;
}

/// Arc wrapper for TradeTransport trait objects.
pub type DynTransport = Arc<dyn TradeTransport>;

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> NegotiationResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> NegotiationResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NegotiationError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(&self, url: String, body: Value) -> Result<Value, TransportError> {
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status.as_u16(), &text));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Unreachable(format!("Failed to parse response: {e}")))
    }
}

impl TradeTransport for HttpTransport {
    fn post<'a>(
        &'a self,
        provider: &'a Provider,
        path: &'static str,
        body: Value,
    ) -> BoxFuture<'a, Result<Value, TransportError>> {
        Box::pin(self.send(provider.url(path), body))
    }
}

/// Classify a non-success response body.
fn parse_error_body(status: u16, text: &str) -> TransportError {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| validate_provider_error(&v).ok())
        .map(TransportError::Rejected)
        .unwrap_or_else(|| TransportError::Unreachable(format!("HTTP {status}: {text}")))
}

/// Mock transport for testing.
///
/// Replies are queued per path and served in order. A path with nothing
/// queued answers `Unreachable`.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<&'static str, VecDeque<Result<Value, TransportError>>>>,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply for `path`.
    pub fn reply(&self, path: &'static str, body: Value) {
        self.push(path, Ok(body));
    }

    /// Queue a provider error body for `path`.
    pub fn reject(&self, path: &'static str, code: i64, message: &str) {
        self.push(
            path,
            Err(TransportError::Rejected(ProviderErrorBody {
                code,
                message: message.to_string(),
            })),
        );
    }

    fn push(&self, path: &'static str, reply: Result<Value, TransportError>) {
        self.replies.lock().entry(path).or_default().push_back(reply);
    }

    /// Requests received so far, as `(url, body)`.
    pub fn get_requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().clone()
    }
}

impl TradeTransport for MockTransport {
    fn post<'a>(
        &'a self,
        provider: &'a Provider,
        path: &'static str,
        body: Value,
    ) -> BoxFuture<'a, Result<Value, TransportError>> {
        Box::pin(async move {
            self.requests.lock().push((provider.url(path), body));
            self.replies
                .lock()
                .get_mut(path)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Err(TransportError::Unreachable("no reply queued".to_string())))
        })
    }
}
