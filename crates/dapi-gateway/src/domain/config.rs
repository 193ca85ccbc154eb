//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// JSON-RPC server configuration
    pub rpc: RpcServerConfig,
    /// Network the gateway fronts
    pub network: Network,
    /// Backend service endpoints
    pub backends: BackendsConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            rpc: RpcServerConfig::default(),
            network: Network::default(),
            backends: BackendsConfig::default(),
            limits: LimitsConfig::default(),
            timeouts: TimeoutConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.limits.max_batch_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_batch_size cannot be 0".into(),
            ));
        }

        if self.timeouts.backend.as_millis() == 0 {
            return Err(ConfigError::InvalidTimeout(
                "backend timeout cannot be 0".into(),
            ));
        }

        for (name, url) in [
            ("core", &self.backends.core.url),
            ("insight", &self.backends.insight.url),
            ("drive", &self.backends.drive.url),
            ("tendermint", &self.backends.tendermint.url),
        ] {
            if url.is_empty() {
                return Err(ConfigError::InvalidEndpoint(name));
            }
        }

        if self.backends.spv.enabled && self.backends.spv.url.is_empty() {
            return Err(ConfigError::InvalidEndpoint("spv"));
        }

        Ok(())
    }

    /// Get JSON-RPC server bind address
    pub fn rpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.rpc.host, self.rpc.port)
    }
}

/// JSON-RPC server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcServerConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
        }
    }
}

/// Network mode; gates the regression-test command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Regtest,
    Devnet,
}

impl Network {
    /// Regression/development modes expose block-generation commands.
    pub fn is_regression(&self) -> bool {
        matches!(self, Network::Regtest | Network::Devnet)
    }
}

/// Backend service endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Dash Core JSON-RPC
    pub core: EndpointConfig,
    /// Insight address index REST API
    pub insight: EndpointConfig,
    /// Drive packet storage
    pub drive: EndpointConfig,
    /// Tendermint consensus node RPC
    pub tendermint: EndpointConfig,
    /// SPV bloom-filter service (optional deployment profile)
    pub spv: SpvConfig,
}

/// One backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL
    pub url: String,
    /// Optional basic-auth username
    pub username: Option<String>,
    /// Optional basic-auth password
    pub password: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:0".into(),
            username: None,
            password: None,
        }
    }
}

/// SPV service endpoint; the SPV command set is merged into the registry
/// only when enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpvConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for SpvConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
        }
    }
}

/// Request validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes
    pub max_request_size: usize,
    /// Max requests in one batch
    pub max_batch_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
            max_batch_size: 25,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for a single backend call
    #[serde(with = "humantime_serde")]
    pub backend: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            backend: Duration::from_secs(30),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Allowed origins; empty means any
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("backend '{0}' has no url configured")]
    InvalidEndpoint(&'static str),
}
