//! DAPI Gateway - JSON-RPC interface to Dash blockchain infrastructure.
//!
//! The gateway registers named operations with typed argument contracts,
//! routes calls to backend collaborators, and normalizes every failure into
//! one JSON-RPC error envelope. The hard services (node, address index,
//! filter matching, consensus) live behind outbound ports.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DAPI GATEWAY                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  HTTP/JSON-RPC (axum)                                        │
//! │        │                                                     │
//! │  ┌─────┴──────────────────────────┐                          │
//! │  │ Middleware: CORS → Validation  │                          │
//! │  └─────┬──────────────────────────┘                          │
//! │        │                                                     │
//! │  ┌─────┴──────────────────────────┐                          │
//! │  │ Command Registry               │  schema validate →       │
//! │  │ (assembled once per profile)   │  handler → normalize     │
//! │  └─────┬──────────────────────────┘                          │
//! └────────┼─────────────────────────────────────────────────────┘
//!          │ outbound ports
//!   ┌──────┼──────────┬──────────────┬───────────────┐
//!   ▼      ▼          ▼              ▼               ▼
//!  Core  Insight   SPV service   Drive storage   Consensus node
//! ```
//!
//! # Deployment profiles
//!
//! The base command set is always registered. The SPV set is merged when an
//! SPV service is configured, and the block-generation set only on
//! regression/development networks. Both gates are evaluated once at
//! startup.
//!
//! # Usage
//!
//! ```ignore
//! use dapi_gateway::{Backends, GatewayConfig, GatewayServer};
//!
//! let config = GatewayConfig::default();
//! let mut server = GatewayServer::new(config, backends)?;
//! server.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod server;
pub mod transition;

// Re-exports for public API
pub use commands::{assemble_registry, Backends, Command, CommandHandler, CommandRegistry,
    HandlerError};
pub use domain::config::{GatewayConfig, Network};
pub use domain::error::{GatewayError, RpcError, RpcResult};
pub use domain::schema::{FieldKind, Schema};
pub use server::{GatewayServer, ShutdownHandle};
pub use transition::{TransitionBroadcaster, TransitionHeader};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client version string reported by the health endpoint and logs
pub fn client_version() -> String {
    format!("DapiGateway/v{}/rust", VERSION)
}
