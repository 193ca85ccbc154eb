//! SPV bloom-filter commands.
//!
//! Each operation decodes the wire filter, then delegates to the SPV
//! service; no matching logic lives here. The three boolean filter
//! operations share one handler parameterized by the delegate method.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::commands::{decode_params, Command, CommandHandler, CommandRegistry, HandlerError};
use crate::domain::error::RpcError;
use crate::domain::schema::{FieldKind, Schema};
use crate::domain::types::{BloomFilter, BloomFilterSpec};
use crate::ports::outbound::SpvService;

/// Which SPV delegate a boolean filter command calls.
#[derive(Debug, Clone, Copy)]
enum FilterOp {
    Load,
    Clear,
}

/// Register the SPV command set. Only merged into the registry for
/// SPV-enabled deployments.
pub fn register(registry: &mut CommandRegistry, spv: Arc<dyn SpvService>) {
    registry.register(Command::new(
        "loadBloomFilter",
        filter_schema("filter"),
        Arc::new(FilterCommand {
            spv: Arc::clone(&spv),
            op: FilterOp::Load,
        }),
    ));

    registry.register(Command::new(
        "clearBloomFilter",
        filter_schema("filter"),
        Arc::new(FilterCommand {
            spv: Arc::clone(&spv),
            op: FilterOp::Clear,
        }),
    ));

    registry.register(Command::new(
        "addToBloomFilter",
        Schema::object()
            .required("originalFilter", FieldKind::Object)
            .required("element", FieldKind::hex()),
        Arc::new(AddToBloomFilter {
            spv: Arc::clone(&spv),
        }),
    ));

    registry.register(Command::new(
        "getSpvData",
        filter_schema("filter"),
        Arc::new(GetSpvData {
            spv: Arc::clone(&spv),
        }),
    ));

    registry.register(Command::new(
        "findDataForBlock",
        filter_schema("filter").required("blockHash", FieldKind::hex_exact(64)),
        Arc::new(FindDataForBlock { spv }),
    ));
}

fn filter_schema(field: &'static str) -> Schema {
    Schema::object().required(field, FieldKind::Object)
}

/// Decode the wire filter object under `field` into the domain value.
fn decode_filter(params: Option<&Value>, field: &str) -> Result<BloomFilter, HandlerError> {
    let spec_value = params
        .and_then(|p| p.get(field))
        .cloned()
        .ok_or_else(|| HandlerError::Internal(format!("'{field}' missing after validation")))?;

    let spec: BloomFilterSpec = serde_json::from_value(spec_value).map_err(|e| {
        HandlerError::Client(RpcError::invalid_params(format!("params.{field}: {e}")))
    })?;

    Ok(spec.decode()?)
}

/// loadBloomFilter / clearBloomFilter - decode filter, delegate, return bool
struct FilterCommand {
    spv: Arc<dyn SpvService>,
    op: FilterOp,
}

#[async_trait]
impl CommandHandler for FilterCommand {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let filter = decode_filter(params, "filter")?;
        let accepted = match self.op {
            FilterOp::Load => self.spv.load_bloom_filter(&filter).await?,
            FilterOp::Clear => self.spv.clear_bloom_filter(&filter).await?,
        };
        Ok(json!(accepted))
    }
}

/// addToBloomFilter - extend an already-loaded filter with one element
struct AddToBloomFilter {
    spv: Arc<dyn SpvService>,
}

#[async_trait]
impl CommandHandler for AddToBloomFilter {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            element: String,
        }

        let filter = decode_filter(params, "originalFilter")?;
        let p: Params = decode_params(params)?;
        let element = hex::decode(&p.element)
            .map_err(|_| RpcError::invalid_params("params.element should be hex string"))?;

        let accepted = self.spv.add_to_bloom_filter(&filter, &element).await?;
        Ok(json!(accepted))
    }
}

/// getSpvData - accumulated matches for a loaded filter
struct GetSpvData {
    spv: Arc<dyn SpvService>,
}

#[async_trait]
impl CommandHandler for GetSpvData {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let filter = decode_filter(params, "filter")?;
        let data = self.spv.get_spv_data(&filter).await?;
        serde_json::to_value(data)
            .map_err(|e| HandlerError::Internal(format!("spv data serialization: {e}")))
    }
}

/// findDataForBlock - merkle block + matched transactions for one block
struct FindDataForBlock {
    spv: Arc<dyn SpvService>,
}

#[async_trait]
impl CommandHandler for FindDataForBlock {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "blockHash")]
            block_hash: String,
        }

        let filter = decode_filter(params, "filter")?;
        let p: Params = decode_params(params)?;
        let data = self.spv.find_data_for_block(&filter, &p.block_hash).await?;
        serde_json::to_value(data)
            .map_err(|e| HandlerError::Internal(format!("block data serialization: {e}")))
    }
}
