//! Command dispatch: descriptors, the registry, and error normalization.
//!
//! Every operation the gateway exposes is a [`Command`]: an operation name
//! bound to a compiled argument [`Schema`] and a handler holding typed
//! references to its backend collaborators. The [`CommandRegistry`] is
//! assembled once at startup (profile gates included) and is read-only for
//! the process lifetime.

pub mod address;
pub mod core;
pub mod platform;
pub mod spv;
pub mod transition;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::domain::config::Network;
use crate::domain::error::{codes, RpcError};
use crate::domain::schema::Schema;
use crate::ports::outbound::{
    AddressIndex, BackendError, ConsensusBroadcast, CoreRpc, PacketStorage, SpvService,
};
use crate::transition::BroadcastError;

/// A command handler body. Arguments have already passed schema validation
/// when `call` runs.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError>;
}

/// Failure modes a handler can produce, before normalization.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Already-shaped client error (parameter decode, value-object bounds)
    #[error(transparent)]
    Client(#[from] RpcError),

    /// Backend collaborator failure
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// State transition broadcast failure
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),

    /// Programming error; logged, never sent to the wire verbatim
    #[error("{0}")]
    Internal(String),
}

/// One registered operation: name, compiled schema, handler with its bound
/// collaborators.
pub struct Command {
    name: &'static str,
    schema: Schema,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(name: &'static str, schema: Schema, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name,
            schema,
            handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Operation name → command mapping, built once and never mutated after
/// assembly.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Later registrations win, which the assembly
    /// order never exercises.
    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name, command);
    }

    /// Whether an operation name is registered.
    pub fn contains(&self, method: &str) -> bool {
        self.commands.contains_key(method)
    }

    /// Registered operation names, sorted.
    pub fn method_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Validate and route one call.
    ///
    /// Validation runs before the handler; the handler only runs on
    /// conforming input. Every failure leaves through [`normalize_error`],
    /// so callers always see a stable `{code, message}` shape.
    pub async fn dispatch(&self, method: &str, params: Option<&Value>) -> Result<Value, RpcError> {
        let command = self
            .commands
            .get(method)
            .ok_or_else(|| RpcError::method_not_found(method))?;

        command.schema.validate(params)?;

        command
            .handler
            .call(params)
            .await
            .map_err(|e| normalize_error(method, e))
    }
}

/// Backend collaborators available to registry assembly.
pub struct Backends {
    pub core: Arc<dyn CoreRpc>,
    pub address_index: Arc<dyn AddressIndex>,
    pub storage: Arc<dyn PacketStorage>,
    pub consensus: Arc<dyn ConsensusBroadcast>,
    /// Present only in SPV-enabled deployments
    pub spv: Option<Arc<dyn SpvService>>,
}

/// Assemble the dispatch table for one deployment.
///
/// The base set is always present. The SPV set is merged when the SPV
/// service is configured, the regression set only on regression/development
/// networks. Both gates are evaluated here, once, never per call.
pub fn assemble_registry(network: Network, backends: &Backends) -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    core::register(&mut registry, Arc::clone(&backends.core));
    address::register(&mut registry, Arc::clone(&backends.address_index));
    platform::register(&mut registry, Arc::clone(&backends.consensus));
    transition::register(
        &mut registry,
        Arc::clone(&backends.storage),
        Arc::clone(&backends.consensus),
    );

    if let Some(spv) = &backends.spv {
        spv::register(&mut registry, Arc::clone(spv));
    }

    if network.is_regression() {
        core::register_regression(&mut registry, Arc::clone(&backends.core));
    }

    registry
}

/// The single error-normalization point.
///
/// Client errors keep their shape, structured backend errors pass through
/// with their original code/message/data, broadcast rejections surface the
/// acceptance code verbatim in `data`, and anything unexpected is logged
/// and reduced to a generic internal error.
fn normalize_error(method: &str, error: HandlerError) -> RpcError {
    match error {
        HandlerError::Client(e) => e,
        HandlerError::Backend(e) => normalize_backend_error(method, e),
        HandlerError::Broadcast(e) => normalize_broadcast_error(method, e),
        HandlerError::Internal(detail) => {
            error!(method, detail, "unexpected handler failure");
            RpcError::internal("unexpected error")
        }
    }
}

fn normalize_backend_error(method: &str, error: BackendError) -> RpcError {
    match error {
        BackendError::Rpc {
            code,
            message,
            data,
        } => RpcError {
            code,
            message,
            data,
        },
        BackendError::Transport(detail) => RpcError::backend_unavailable(detail),
        BackendError::Decode(detail) => {
            error!(method, detail, "backend response decode failure");
            RpcError::internal("unexpected error")
        }
    }
}

fn normalize_broadcast_error(method: &str, error: BroadcastError) -> RpcError {
    match error {
        BroadcastError::InvalidHeader(e) => RpcError::invalid_params(e.to_string()),
        BroadcastError::PacketRequired | BroadcastError::PacketNotExpected => {
            RpcError::invalid_params(error.to_string())
        }
        BroadcastError::PacketHashMismatch { .. } => {
            RpcError::transaction_rejected(error.to_string())
        }
        BroadcastError::Storage(e) | BroadcastError::Transport(e) => {
            normalize_backend_error(method, e)
        }
        BroadcastError::Rejected {
            phase,
            code,
            log,
            data,
        } => RpcError::with_data(
            codes::TRANSACTION_REJECTED,
            format!("Transaction rejected during {} (code {}): {}", phase, code, log),
            serde_json::json!({
                "phase": phase.to_string(),
                "code": code,
                "log": log,
                "data": data,
            }),
        ),
    }
}

/// Decode validated params into a typed struct.
///
/// Schema validation already ran; a decode failure here is a gateway bug,
/// not a client error.
pub(crate) fn decode_params<T: DeserializeOwned>(
    params: Option<&Value>,
) -> Result<T, HandlerError> {
    let value = params
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::from_value(value)
        .map_err(|e| HandlerError::Internal(format!("params decode after validation: {e}")))
}
