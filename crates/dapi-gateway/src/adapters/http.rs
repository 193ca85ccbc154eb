//! Shared JSON-RPC-over-HTTP client used by the backend adapters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::ports::outbound::BackendError;

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e.to_string())
    }
}

/// JSON-RPC 2.0 client for one backend endpoint.
pub struct JsonRpcHttpClient {
    http: reqwest::Client,
    url: String,
    auth: Option<(String, String)>,
    next_id: AtomicU64,
}

impl JsonRpcHttpClient {
    /// `http` is built once (with the configured timeout) and shared across
    /// adapters; reqwest clients clone cheaply onto the same pool.
    pub fn new(http: reqwest::Client, url: String, auth: Option<(String, String)>) -> Self {
        Self {
            http,
            url,
            auth,
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue one call and decode its `result`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, BackendError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(url = %self.url, method, id, "backend call");

        let mut request = self.http.post(&self.url).json(&body);
        if let Some((username, password)) = &self.auth {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?;
        let envelope: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        decode_envelope(envelope)
    }
}

/// Split a JSON-RPC response envelope into a structured error or a decoded
/// result.
pub(crate) fn decode_envelope<T: DeserializeOwned>(envelope: Value) -> Result<T, BackendError> {
    if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
        return Err(BackendError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(-32603) as i32,
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("backend error")
                .to_string(),
            data: error.get("data").filter(|d| !d.is_null()).cloned(),
        });
    }

    let result = envelope
        .get("result")
        .cloned()
        .ok_or_else(|| BackendError::Decode("response has neither result nor error".into()))?;

    serde_json::from_value(result).map_err(|e| BackendError::Decode(e.to_string()))
}
