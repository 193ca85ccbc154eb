//! Adapters: HTTP client implementations of the outbound ports.

pub mod core;
pub mod drive;
pub mod http;
pub mod insight;
pub mod spv;
pub mod tendermint;

pub use self::core::CoreRpcClient;
pub use drive::DriveStorageClient;
pub use http::JsonRpcHttpClient;
pub use insight::InsightClient;
pub use spv::SpvServiceClient;
pub use tendermint::TendermintClient;
