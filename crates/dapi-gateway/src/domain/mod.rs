//! Domain layer: configuration, error envelope, argument schemas, wire
//! value objects, and hashing primitives.

pub mod config;
pub mod error;
pub mod hash;
pub mod schema;
pub mod types;

pub use config::{GatewayConfig, Network};
pub use error::{GatewayError, RpcError, RpcResult};
pub use schema::{FieldKind, Schema};
