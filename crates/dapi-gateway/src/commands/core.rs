//! Commands backed by the blockchain node RPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::commands::{decode_params, Command, CommandHandler, CommandRegistry, HandlerError};
use crate::domain::schema::{FieldKind, Schema};
use crate::ports::outbound::CoreRpc;

/// Register the always-present node commands.
pub fn register(registry: &mut CommandRegistry, core: Arc<dyn CoreRpc>) {
    registry.register(Command::new(
        "estimateFee",
        Schema::object().required("nbBlocks", FieldKind::integer_min(0)),
        Arc::new(EstimateFee {
            core: Arc::clone(&core),
        }),
    ));

    registry.register(Command::new(
        "getBestBlockHeight",
        Schema::object(),
        Arc::new(GetBestBlockHeight {
            core: Arc::clone(&core),
        }),
    ));

    registry.register(Command::new(
        "getBlockHash",
        Schema::object().required("height", FieldKind::integer_min(0)),
        Arc::new(GetBlockHash {
            core: Arc::clone(&core),
        }),
    ));

    registry.register(Command::new(
        "sendRawTransaction",
        Schema::object().required("rawTransaction", FieldKind::hex()),
        Arc::new(SendRawTransaction {
            core: Arc::clone(&core),
        }),
    ));

    registry.register(Command::new(
        "getMnListDiff",
        Schema::object()
            .required("baseBlockHash", FieldKind::hex_exact(64))
            .required("blockHash", FieldKind::hex_exact(64)),
        Arc::new(GetMnListDiff { core }),
    ));
}

/// Register the regression-network-only block generation commands.
///
/// Callers gate this on the network mode; it must never run for a
/// production profile.
pub fn register_regression(registry: &mut CommandRegistry, core: Arc<dyn CoreRpc>) {
    registry.register(Command::new(
        "generate",
        Schema::object().required("amount", FieldKind::integer_min(0)),
        Arc::new(Generate {
            core: Arc::clone(&core),
        }),
    ));

    registry.register(Command::new(
        "generateToAddress",
        Schema::object()
            .required("blocksNumber", FieldKind::integer_min(1))
            .required("address", FieldKind::String),
        Arc::new(GenerateToAddress { core }),
    ));
}

/// estimateFee - fee rate for confirmation within `nbBlocks` blocks
struct EstimateFee {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for EstimateFee {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "nbBlocks")]
            nb_blocks: u32,
        }

        let p: Params = decode_params(params)?;
        let fee = self.core.estimate_fee(p.nb_blocks).await?;
        Ok(json!(fee))
    }
}

/// getBestBlockHeight - tip height of the chain
struct GetBestBlockHeight {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for GetBestBlockHeight {
    #[instrument(skip(self, _params))]
    async fn call(&self, _params: Option<&Value>) -> Result<Value, HandlerError> {
        let height = self.core.get_best_block_height().await?;
        Ok(json!(height))
    }
}

/// getBlockHash - block hash at a height
struct GetBlockHash {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for GetBlockHash {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            height: u32,
        }

        let p: Params = decode_params(params)?;
        let hash = self.core.get_block_hash(p.height).await?;
        Ok(json!(hash))
    }
}

/// sendRawTransaction - submit a signed transaction, returns its id
struct SendRawTransaction {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for SendRawTransaction {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "rawTransaction")]
            raw_transaction: String,
        }

        let p: Params = decode_params(params)?;
        let txid = self.core.send_raw_transaction(&p.raw_transaction).await?;
        Ok(json!(txid))
    }
}

/// getMnListDiff - masternode list changes between two blocks
struct GetMnListDiff {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for GetMnListDiff {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "baseBlockHash")]
            base_block_hash: String,
            #[serde(rename = "blockHash")]
            block_hash: String,
        }

        let p: Params = decode_params(params)?;
        let diff = self
            .core
            .get_mn_list_diff(&p.base_block_hash, &p.block_hash)
            .await?;
        serde_json::to_value(diff)
            .map_err(|e| HandlerError::Internal(format!("diff serialization: {e}")))
    }
}

/// generate - mine blocks (regression networks only)
struct Generate {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for Generate {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            amount: u32,
        }

        let p: Params = decode_params(params)?;
        let hashes = self.core.generate(p.amount).await?;
        Ok(json!(hashes))
    }
}

/// generateToAddress - mine blocks paying a given address (regression only)
struct GenerateToAddress {
    core: Arc<dyn CoreRpc>,
}

#[async_trait]
impl CommandHandler for GenerateToAddress {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "blocksNumber")]
            blocks_number: u32,
            address: String,
        }

        let p: Params = decode_params(params)?;
        let hashes = self
            .core
            .generate_to_address(p.blocks_number, &p.address)
            .await?;
        Ok(json!(hashes))
    }
}
