//! DAPI gateway binary.
//!
//! Loads configuration, builds the backend adapters, and serves JSON-RPC
//! until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dapi_gateway::adapters::{
    CoreRpcClient, DriveStorageClient, InsightClient, JsonRpcHttpClient, SpvServiceClient,
    TendermintClient,
};
use dapi_gateway::domain::config::EndpointConfig;
use dapi_gateway::ports::outbound::SpvService;
use dapi_gateway::{Backends, GatewayConfig, GatewayServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = load_config().context("failed to load configuration")?;

    info!(version = dapi_gateway::VERSION, network = ?config.network, "starting {}", dapi_gateway::client_version());

    let backends = build_backends(&config).context("failed to build backend clients")?;

    let server = GatewayServer::new(config, backends).context("failed to create gateway")?;

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            shutdown.shutdown();
        }
    });

    server.start().await.context("gateway server failed")?;

    Ok(())
}

/// Load configuration from the path in argv[1] or `DAPI_CONFIG`, falling
/// back to defaults.
fn load_config() -> Result<GatewayConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DAPI_CONFIG").ok());

    match path {
        Some(path) => {
            info!(%path, "loading configuration");
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read config file {path}"))?;
            serde_json::from_str(&contents).with_context(|| format!("cannot parse {path}"))
        }
        None => {
            info!("no config file given, using defaults");
            Ok(GatewayConfig::default())
        }
    }
}

/// Build the HTTP adapters for every configured backend.
fn build_backends(config: &GatewayConfig) -> Result<Backends> {
    let http = reqwest::Client::builder()
        .timeout(config.timeouts.backend)
        .build()
        .context("failed to build HTTP client")?;

    let spv: Option<Arc<dyn SpvService>> = if config.backends.spv.enabled {
        Some(Arc::new(SpvServiceClient::new(JsonRpcHttpClient::new(
            http.clone(),
            config.backends.spv.url.clone(),
            None,
        ))))
    } else {
        None
    };

    Ok(Backends {
        core: Arc::new(CoreRpcClient::new(rpc_client(&http, &config.backends.core))),
        address_index: Arc::new(InsightClient::new(
            http.clone(),
            config.backends.insight.url.clone(),
        )),
        storage: Arc::new(DriveStorageClient::new(rpc_client(
            &http,
            &config.backends.drive,
        ))),
        consensus: Arc::new(TendermintClient::new(rpc_client(
            &http,
            &config.backends.tendermint,
        ))),
        spv,
    })
}

fn rpc_client(http: &reqwest::Client, endpoint: &EndpointConfig) -> JsonRpcHttpClient {
    let auth = endpoint
        .username
        .clone()
        .zip(endpoint.password.clone());
    JsonRpcHttpClient::new(http.clone(), endpoint.url.clone(), auth)
}
