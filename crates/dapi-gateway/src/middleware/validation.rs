//! Request validation middleware.
//!
//! Validates request size, batch limits, and JSON-RPC structure before the
//! router sees the body.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use bytes::Bytes;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

use crate::domain::config::LimitsConfig;
use crate::domain::error::{codes, RpcError};

/// Validation layer configuration
#[derive(Clone)]
pub struct ValidationLayer {
    config: Arc<LimitsConfig>,
}

impl ValidationLayer {
    pub fn new(config: LimitsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Validation service
#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    config: Arc<LimitsConfig>,
}

impl<S> Service<Request<Body>> for ValidationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Content-length header first (fast path)
            if let Some(content_length) = req.headers().get("content-length") {
                if let Some(len) = content_length
                    .to_str()
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                {
                    if len > config.max_request_size {
                        warn!(size = len, max = config.max_request_size, "request too large");
                        return Ok(error_response(RpcError::limit_exceeded(format!(
                            "request size {} exceeds limit {}",
                            len, config.max_request_size
                        ))));
                    }
                }
            }

            if req.method() != axum::http::Method::POST {
                // Non-POST requests pass through (health checks)
                return inner.call(req).await;
            }

            let (parts, body) = req.into_parts();

            let body_bytes = match read_body_with_limit(body, config.max_request_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "failed to read request body");
                    return Ok(error_response(e));
                }
            };

            if let Err(e) = validate_jsonrpc(&body_bytes, &config) {
                warn!(error = %e, "invalid JSON-RPC request");
                return Ok(error_response(e));
            }

            let req = Request::from_parts(parts, Body::from(body_bytes));
            inner.call(req).await
        })
    }
}

async fn read_body_with_limit(body: Body, max_size: usize) -> Result<Bytes, RpcError> {
    axum::body::to_bytes(body, max_size)
        .await
        .map_err(|e| RpcError::limit_exceeded(format!("failed to read body: {}", e)))
}

/// Validate JSON-RPC request structure.
///
/// Exported for integration testing.
pub fn validate_jsonrpc(body: &[u8], config: &LimitsConfig) -> Result<(), RpcError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| RpcError::parse_error(e.to_string()))?;

    match value {
        serde_json::Value::Object(obj) => {
            validate_single_request(&obj)?;
        }
        serde_json::Value::Array(arr) => {
            if arr.is_empty() {
                return Err(RpcError::invalid_request("empty batch request"));
            }

            if arr.len() > config.max_batch_size {
                return Err(RpcError::limit_exceeded(format!(
                    "batch size {} exceeds limit {}",
                    arr.len(),
                    config.max_batch_size
                )));
            }

            for (idx, item) in arr.iter().enumerate() {
                if let serde_json::Value::Object(obj) = item {
                    validate_single_request(obj).map_err(|e| {
                        RpcError::invalid_request(format!("batch item {}: {}", idx, e.message))
                    })?;
                } else {
                    return Err(RpcError::invalid_request(format!(
                        "batch item {} is not an object",
                        idx
                    )));
                }
            }
        }
        _ => {
            return Err(RpcError::invalid_request(
                "request must be an object or array",
            ));
        }
    }

    Ok(())
}

fn validate_single_request(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<(), RpcError> {
    match obj.get("jsonrpc") {
        Some(serde_json::Value::String(v)) if v == "2.0" => {}
        Some(_) => {
            return Err(RpcError::invalid_request("jsonrpc must be \"2.0\""));
        }
        None => {
            return Err(RpcError::invalid_request("missing jsonrpc field"));
        }
    }

    match obj.get("method") {
        Some(serde_json::Value::String(method)) => {
            if method.is_empty() {
                return Err(RpcError::invalid_request("method cannot be empty"));
            }
            if method.len() > 256 {
                return Err(RpcError::invalid_request("method name too long"));
            }
        }
        Some(_) => {
            return Err(RpcError::invalid_request("method must be a string"));
        }
        None => {
            return Err(RpcError::invalid_request("missing method field"));
        }
    }

    if let Some(id) = obj.get("id") {
        match id {
            serde_json::Value::String(_)
            | serde_json::Value::Number(_)
            | serde_json::Value::Null => {}
            _ => {
                return Err(RpcError::invalid_request(
                    "id must be string, number, or null",
                ));
            }
        }
    }

    if let Some(params) = obj.get("params") {
        match params {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {}
            _ => {
                return Err(RpcError::invalid_request("params must be array or object"));
            }
        }
    }

    Ok(())
}

/// Shape a transport-level rejection as a JSON-RPC error response.
fn error_response(error: RpcError) -> Response {
    let status = match error.code {
        codes::PARSE_ERROR | codes::INVALID_REQUEST => StatusCode::BAD_REQUEST,
        codes::LIMIT_EXCEEDED => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "error": error,
        "id": null
    });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("Content-Type", "application/json".parse().expect("static header"));

    response
}
