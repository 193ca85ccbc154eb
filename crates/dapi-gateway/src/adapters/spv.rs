//! SPV bloom-filter service adapter.

use async_trait::async_trait;
use serde_json::json;

use crate::adapters::http::JsonRpcHttpClient;
use crate::domain::types::{BlockSpvData, BloomFilter, SpvData};
use crate::ports::outbound::{BackendError, SpvService};

/// `SpvService` over the filter service's JSON-RPC interface.
pub struct SpvServiceClient {
    rpc: JsonRpcHttpClient,
}

impl SpvServiceClient {
    pub fn new(rpc: JsonRpcHttpClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl SpvService for SpvServiceClient {
    async fn load_bloom_filter(&self, filter: &BloomFilter) -> Result<bool, BackendError> {
        self.rpc
            .call("loadBloomFilter", json!({ "filter": filter }))
            .await
    }

    async fn add_to_bloom_filter(
        &self,
        original_filter: &BloomFilter,
        element: &[u8],
    ) -> Result<bool, BackendError> {
        self.rpc
            .call(
                "addToBloomFilter",
                json!({"originalFilter": original_filter, "element": hex::encode(element)}),
            )
            .await
    }

    async fn clear_bloom_filter(&self, filter: &BloomFilter) -> Result<bool, BackendError> {
        self.rpc
            .call("clearBloomFilter", json!({ "filter": filter }))
            .await
    }

    async fn get_spv_data(&self, filter: &BloomFilter) -> Result<SpvData, BackendError> {
        self.rpc.call("getSpvData", json!({ "filter": filter })).await
    }

    async fn find_data_for_block(
        &self,
        filter: &BloomFilter,
        block_hash: &str,
    ) -> Result<BlockSpvData, BackendError> {
        self.rpc
            .call(
                "findDataForBlock",
                json!({"filter": filter, "blockHash": block_hash}),
            )
            .await
    }
}
