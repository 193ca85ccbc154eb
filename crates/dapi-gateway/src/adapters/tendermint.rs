//! Consensus node adapter (Tendermint-style RPC).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::adapters::http::JsonRpcHttpClient;
use crate::ports::outbound::{
    AbciQueryResult, BackendError, BroadcastTxCommitResult, ConsensusBroadcast,
};

/// `ConsensusBroadcast` over the consensus node's JSON-RPC interface.
pub struct TendermintClient {
    rpc: JsonRpcHttpClient,
}

impl TendermintClient {
    pub fn new(rpc: JsonRpcHttpClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl ConsensusBroadcast for TendermintClient {
    async fn broadcast_tx_commit(
        &self,
        tx: &[u8],
    ) -> Result<BroadcastTxCommitResult, BackendError> {
        self.rpc
            .call(
                "broadcast_tx_commit",
                json!({"tx": BASE64.encode(tx)}),
            )
            .await
    }

    async fn abci_query(&self, path: &str, data: &[u8]) -> Result<AbciQueryResult, BackendError> {
        let result: Value = self
            .rpc
            .call(
                "abci_query",
                json!({"path": path, "data": hex::encode(data)}),
            )
            .await?;

        decode_query_response(result)
    }
}

/// `abci_query` nests the ABCI reply under a `response` key.
fn decode_query_response(result: Value) -> Result<AbciQueryResult, BackendError> {
    let response = result
        .get("response")
        .cloned()
        .ok_or_else(|| BackendError::Decode("abci_query result has no response".into()))?;

    serde_json::from_value(response).map_err(|e| BackendError::Decode(e.to_string()))
}
