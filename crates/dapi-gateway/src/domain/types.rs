//! Wire-level value objects shared between commands and backend adapters.

use serde::{Deserialize, Serialize};

use crate::domain::error::RpcError;

/// BIP37 limits for bloom filters on the wire.
pub const MAX_FILTER_SIZE: usize = 36_000;
pub const MAX_HASH_FUNCS: u32 = 50;

/// A bloom filter as it appears in call parameters.
///
/// The gateway only reconstructs and bounds-checks the value object; all
/// matching is delegated to the SPV service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomFilterSpec {
    /// Filter bit data, hex encoded
    pub v_data: String,
    /// Number of hash functions (k)
    pub n_hash_funcs: u32,
    /// Tweak added to the hash seed
    pub n_tweak: u32,
    /// Update flags
    pub n_flags: u8,
}

impl BloomFilterSpec {
    /// Decode the hex data and enforce BIP37 bounds.
    pub fn decode(&self) -> Result<BloomFilter, RpcError> {
        let data = hex::decode(&self.v_data)
            .map_err(|_| RpcError::invalid_params("params.filter.vData should be hex string"))?;

        if data.is_empty() || data.len() > MAX_FILTER_SIZE {
            return Err(RpcError::invalid_params(format!(
                "params.filter.vData should be between 1 and {} bytes",
                MAX_FILTER_SIZE
            )));
        }

        if self.n_hash_funcs == 0 || self.n_hash_funcs > MAX_HASH_FUNCS {
            return Err(RpcError::invalid_params(format!(
                "params.filter.nHashFuncs should be between 1 and {}",
                MAX_HASH_FUNCS
            )));
        }

        Ok(BloomFilter {
            data,
            n_hash_funcs: self.n_hash_funcs,
            n_tweak: self.n_tweak,
            n_flags: self.n_flags,
        })
    }
}

/// Decoded bloom filter handed to the SPV service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomFilter {
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub n_hash_funcs: u32,
    pub n_tweak: u32,
    pub n_flags: u8,
}

/// Serde support for hex-encoded byte fields.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// A single address or a list of addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressSelector {
    One(String),
    Many(Vec<String>),
}

impl AddressSelector {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            AddressSelector::One(address) => vec![address],
            AddressSelector::Many(addresses) => addresses,
        }
    }

    pub fn as_vec(&self) -> Vec<String> {
        self.clone().into_vec()
    }
}

/// Paging window for address-index queries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingOptions {
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub from_height: Option<u32>,
    pub to_height: Option<u32>,
}

/// Address summary as returned by the address index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSummary {
    pub balance: u64,
    pub total_received: u64,
    pub total_sent: u64,
    pub unconfirmed_balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One unspent output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub address: String,
    pub txid: String,
    pub output_index: u32,
    pub script: String,
    pub satoshis: u64,
    pub height: i64,
}

/// Paged UTXO result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoPage {
    pub total_items: u64,
    pub from: u32,
    pub to: u32,
    pub items: Vec<Utxo>,
}

/// Masternode list diff between two block hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasternodeListDiff {
    pub base_block_hash: String,
    pub block_hash: String,
    #[serde(rename = "deletedMNs")]
    pub deleted_mns: Vec<serde_json::Value>,
    pub mn_list: Vec<serde_json::Value>,
    #[serde(rename = "merkleRootMNList")]
    pub merkle_root_mn_list: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Merkle block + matched transactions for one block, as produced by the
/// SPV service for a loaded filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSpvData {
    pub merkle_block: String,
    pub transactions: Vec<String>,
}

/// Accumulated SPV data for a filter since it was loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpvData {
    pub hashes: Vec<String>,
    pub merkle_blocks: Vec<String>,
}
