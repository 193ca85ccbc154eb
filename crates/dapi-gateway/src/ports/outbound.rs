//! Outbound ports: the backend collaborators the gateway calls into.
//!
//! Every port is an async trait injected as `Arc<dyn _>` at registry
//! assembly; the gateway owns no backend state of its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    AddressSummary, BlockSpvData, BloomFilter, MasternodeListDiff, PagingOptions, SpvData,
    UtxoPage,
};

/// Backend failure modes.
///
/// Structured `Rpc` errors carry the collaborator's own code/message/data and
/// pass through to the caller unchanged; everything else is a gateway-side
/// server error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport-level failure (connection refused, timeout, bad HTTP status)
    #[error("transport error: {0}")]
    Transport(String),

    /// Structured error returned by the backend itself
    #[error("{message}")]
    Rpc {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// Response arrived but could not be decoded
    #[error("invalid backend response: {0}")]
    Decode(String),
}

/// Blockchain node RPC surface.
#[async_trait]
pub trait CoreRpc: Send + Sync {
    async fn estimate_fee(&self, nb_blocks: u32) -> Result<f64, BackendError>;

    async fn get_best_block_height(&self) -> Result<u64, BackendError>;

    async fn get_block_hash(&self, height: u32) -> Result<String, BackendError>;

    async fn send_raw_transaction(&self, raw_transaction: &str) -> Result<String, BackendError>;

    async fn get_mn_list_diff(
        &self,
        base_block_hash: &str,
        block_hash: &str,
    ) -> Result<MasternodeListDiff, BackendError>;

    /// Regression networks only
    async fn generate(&self, amount: u32) -> Result<Vec<String>, BackendError>;

    /// Regression networks only
    async fn generate_to_address(
        &self,
        blocks_number: u32,
        address: &str,
    ) -> Result<Vec<String>, BackendError>;
}

/// Insight-style address index.
#[async_trait]
pub trait AddressIndex: Send + Sync {
    async fn get_address_summary(
        &self,
        addresses: &[String],
        no_tx_list: bool,
        paging: PagingOptions,
    ) -> Result<AddressSummary, BackendError>;

    async fn get_transactions_by_address(
        &self,
        addresses: &[String],
        paging: PagingOptions,
    ) -> Result<Vec<serde_json::Value>, BackendError>;

    async fn get_utxo(
        &self,
        addresses: &[String],
        paging: PagingOptions,
    ) -> Result<UtxoPage, BackendError>;
}

/// SPV bloom-filter service; all matching logic lives behind this port.
#[async_trait]
pub trait SpvService: Send + Sync {
    async fn load_bloom_filter(&self, filter: &BloomFilter) -> Result<bool, BackendError>;

    async fn add_to_bloom_filter(
        &self,
        original_filter: &BloomFilter,
        element: &[u8],
    ) -> Result<bool, BackendError>;

    async fn clear_bloom_filter(&self, filter: &BloomFilter) -> Result<bool, BackendError>;

    async fn get_spv_data(&self, filter: &BloomFilter) -> Result<SpvData, BackendError>;

    async fn find_data_for_block(
        &self,
        filter: &BloomFilter,
        block_hash: &str,
    ) -> Result<BlockSpvData, BackendError>;
}

/// Off-chain packet storage (Drive).
#[async_trait]
pub trait PacketStorage: Send + Sync {
    /// Persist a transition packet, keyed by its own content identity.
    async fn store_packet(&self, packet: &[u8]) -> Result<(), BackendError>;
}

/// Consensus node transaction submission and state reads.
#[async_trait]
pub trait ConsensusBroadcast: Send + Sync {
    /// Submit a transaction; pre-check and delivery run synchronously and
    /// both phase results come back in one reply.
    async fn broadcast_tx_commit(&self, tx: &[u8])
        -> Result<BroadcastTxCommitResult, BackendError>;

    /// ABCI-style state read at a query path.
    async fn abci_query(&self, path: &str, data: &[u8]) -> Result<AbciQueryResult, BackendError>;
}

/// One phase of an ABCI broadcast: `code == 0` means accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbciResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Base64 payload, when the application returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl AbciResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Combined result of a commit broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastTxCommitResult {
    pub check_tx: AbciResponse,
    pub deliver_tx: AbciResponse,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub height: Option<String>,
}

/// Result of an `abci_query` read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbciQueryResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: Option<String>,
    /// Base64-encoded value bytes
    #[serde(default)]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abci_zero_code_is_ok() {
        assert!(AbciResponse::default().is_ok());
        let rejected = AbciResponse {
            code: 17,
            log: Some("fee too low".into()),
            data: None,
        };
        assert!(!rejected.is_ok());
    }

    #[test]
    fn test_broadcast_result_decodes_partial_json() {
        let result: BroadcastTxCommitResult = serde_json::from_str(
            r#"{"check_tx":{"code":0},"deliver_tx":{"code":1,"log":"rejected"},"hash":"AB"}"#,
        )
        .unwrap();
        assert!(result.check_tx.is_ok());
        assert!(!result.deliver_tx.is_ok());
        assert_eq!(result.deliver_tx.log.as_deref(), Some("rejected"));
    }
}
