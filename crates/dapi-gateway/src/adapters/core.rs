//! Dash Core node adapter.

use async_trait::async_trait;
use serde_json::json;

use crate::adapters::http::JsonRpcHttpClient;
use crate::domain::types::MasternodeListDiff;
use crate::ports::outbound::{BackendError, CoreRpc};

/// `CoreRpc` over the node's JSON-RPC interface.
pub struct CoreRpcClient {
    rpc: JsonRpcHttpClient,
}

impl CoreRpcClient {
    pub fn new(rpc: JsonRpcHttpClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl CoreRpc for CoreRpcClient {
    async fn estimate_fee(&self, nb_blocks: u32) -> Result<f64, BackendError> {
        self.rpc.call("estimatefee", json!([nb_blocks])).await
    }

    async fn get_best_block_height(&self) -> Result<u64, BackendError> {
        self.rpc.call("getblockcount", json!([])).await
    }

    async fn get_block_hash(&self, height: u32) -> Result<String, BackendError> {
        self.rpc.call("getblockhash", json!([height])).await
    }

    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<String, BackendError> {
        self.rpc
            .call("sendrawtransaction", json!([raw_transaction]))
            .await
    }

    async fn get_mn_list_diff(
        &self,
        base_block_hash: &str,
        block_hash: &str,
    ) -> Result<MasternodeListDiff, BackendError> {
        self.rpc
            .call("protx", json!(["diff", base_block_hash, block_hash]))
            .await
    }

    async fn generate(&self, amount: u32) -> Result<Vec<String>, BackendError> {
        self.rpc.call("generate", json!([amount])).await
    }

    async fn generate_to_address(
        &self,
        blocks_number: u32,
        address: &str,
    ) -> Result<Vec<String>, BackendError> {
        self.rpc
            .call("generatetoaddress", json!([blocks_number, address]))
            .await
    }
}
