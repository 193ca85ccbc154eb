//! Gateway server: JSON-RPC 2.0 over HTTP.
//!
//! One axum router fronts the command registry. Each request is an
//! independent asynchronous unit of work; no ordering is guaranteed between
//! concurrent calls.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::sync::watch;
use tower::ServiceBuilder;
use tracing::{error, info};

use crate::commands::{assemble_registry, Backends, CommandRegistry};
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{create_cors_layer, ValidationLayer};

/// Gateway server state
pub struct GatewayServer {
    config: GatewayConfig,
    registry: Arc<CommandRegistry>,
    shutdown_tx: watch::Sender<bool>,
}

/// Clonable handle for triggering graceful shutdown from another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

impl GatewayServer {
    /// Create a new gateway server.
    ///
    /// Validates the configuration and assembles the command registry once;
    /// the registry is read-only afterwards.
    pub fn new(config: GatewayConfig, backends: Backends) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let registry = Arc::new(assemble_registry(config.network, &backends));

        info!(
            network = ?config.network,
            methods = registry.method_names().len(),
            "command registry assembled"
        );

        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            registry,
            shutdown_tx,
        })
    }

    /// The assembled command registry.
    pub fn registry(&self) -> Arc<CommandRegistry> {
        Arc::clone(&self.registry)
    }

    /// Handle for triggering shutdown from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Serve until shutdown is requested.
    pub async fn start(&self) -> Result<(), GatewayError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let addr = self.config.rpc_addr();
        let router = self.build_router();

        info!(%addr, "starting JSON-RPC server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
                info!("received shutdown signal");
            })
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("JSON-RPC server stopped");
        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    fn build_router(&self) -> Router {
        let state = AppState {
            registry: Arc::clone(&self.registry),
        };

        let middleware = ServiceBuilder::new()
            .layer(create_cors_layer(&self.config.cors))
            .layer(ValidationLayer::new(self.config.limits.clone()));

        Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .layer(middleware)
            .with_state(state)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    registry: Arc<CommandRegistry>,
}

/// Handle a JSON-RPC request body (single or batch).
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "jsonrpc": "2.0",
                    "error": {
                        "code": -32700,
                        "message": format!("Parse error: {}", e)
                    },
                    "id": null
                })),
            );
        }
    };

    let response = if let Some(requests) = request.as_array() {
        let mut responses = Vec::with_capacity(requests.len());
        for req in requests {
            responses.push(process_single_request(&state, req).await);
        }
        serde_json::Value::Array(responses)
    } else {
        process_single_request(&state, &request).await
    };

    (StatusCode::OK, Json(response))
}

/// Process a single JSON-RPC request object.
async fn process_single_request(
    state: &AppState,
    request: &serde_json::Value,
) -> serde_json::Value {
    let id = request.get("id").cloned();

    // Notifications (null id) get no response per JSON-RPC 2.0; reject them
    // instead of silently dropping work.
    if let Some(ref id_val) = id {
        if id_val.is_null() {
            return invalid_request_response("null id (notifications not supported)");
        }

        if let Some(s) = id_val.as_str() {
            if s.is_empty() {
                return invalid_request_response("empty string id");
            }
            if s.len() > 256 {
                return invalid_request_response("id string too long (max 256 chars)");
            }
        }

        if !id_val.is_string() && !id_val.is_number() {
            return invalid_request_response("id must be string or number");
        }
    }

    let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
    let params = request.get("params");

    match state.registry.dispatch(method, params).await {
        Ok(value) => serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": value
        }),
        Err(e) => {
            if e.code == crate::domain::error::codes::INTERNAL_ERROR {
                error!(method, code = e.code, "request failed");
            }
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": e
            })
        }
    }
}

fn invalid_request_response(reason: &str) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "error": {
            "code": -32600,
            "message": format!("Invalid request: {}", reason)
        },
        "id": null
    })
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dapi-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, CommandHandler, HandlerError};
    use crate::domain::schema::{FieldKind, Schema};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct EchoHandler;

    #[async_trait]
    impl CommandHandler for EchoHandler {
        async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
            Ok(params.cloned().unwrap_or(Value::Null))
        }
    }

    fn echo_state() -> AppState {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new(
            "echo",
            Schema::object().optional("value", FieldKind::integer()),
            std::sync::Arc::new(EchoHandler),
        ));
        AppState {
            registry: Arc::new(registry),
        }
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let state = echo_state();
        let response = process_single_request(
            &state,
            &json!({"jsonrpc": "2.0", "id": 1, "method": "echo", "params": {"value": 9}}),
        )
        .await;

        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["value"], 9);
        assert!(response.get("error").is_none());
    }

    #[tokio::test]
    async fn test_error_envelope_for_unknown_method() {
        let state = echo_state();
        let response = process_single_request(
            &state,
            &json!({"jsonrpc": "2.0", "id": "abc", "method": "nope"}),
        )
        .await;

        assert_eq!(response["id"], "abc");
        assert_eq!(response["error"]["code"], -32601);
        assert!(response.get("result").is_none());
    }

    #[tokio::test]
    async fn test_null_id_rejected() {
        let state = echo_state();
        let response = process_single_request(
            &state,
            &json!({"jsonrpc": "2.0", "id": null, "method": "echo"}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_object_id_rejected() {
        let state = echo_state();
        let response = process_single_request(
            &state,
            &json!({"jsonrpc": "2.0", "id": {"nested": true}, "method": "echo"}),
        )
        .await;
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_string_id_preserved() {
        let state = echo_state();
        let response = process_single_request(
            &state,
            &json!({"jsonrpc": "2.0", "id": "req-7", "method": "echo"}),
        )
        .await;
        assert_eq!(response["id"], "req-7");
    }
}
