//! Mock backend collaborators with call counters.
//!
//! Every mock counts its calls so tests can assert that validation
//! failures never reach a backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use dapi_gateway::domain::types::{
    AddressSummary, BlockSpvData, BloomFilter, MasternodeListDiff, PagingOptions, SpvData,
    Utxo, UtxoPage,
};
use dapi_gateway::ports::outbound::{
    AbciQueryResult, AbciResponse, AddressIndex, BackendError, BroadcastTxCommitResult,
    ConsensusBroadcast, CoreRpc, PacketStorage, SpvService,
};
use dapi_gateway::Backends;

pub struct MockCore {
    pub calls: AtomicUsize,
    pub fee: f64,
}

impl Default for MockCore {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fee: 1.0,
        }
    }
}

impl MockCore {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoreRpc for MockCore {
    async fn estimate_fee(&self, _nb_blocks: u32) -> Result<f64, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fee)
    }

    async fn get_best_block_height(&self) -> Result<u64, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1024)
    }

    async fn get_block_hash(&self, height: u32) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{:064x}", height))
    }

    async fn send_raw_transaction(&self, _raw_transaction: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("cd".repeat(32))
    }

    async fn get_mn_list_diff(
        &self,
        base_block_hash: &str,
        block_hash: &str,
    ) -> Result<MasternodeListDiff, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(MasternodeListDiff {
            base_block_hash: base_block_hash.into(),
            block_hash: block_hash.into(),
            deleted_mns: vec![],
            mn_list: vec![json!({"proRegTxHash": "aa".repeat(32)})],
            merkle_root_mn_list: "11".repeat(32),
            extra: Default::default(),
        })
    }

    async fn generate(&self, amount: u32) -> Result<Vec<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..amount).map(|i| format!("{:064x}", i)).collect())
    }

    async fn generate_to_address(
        &self,
        blocks_number: u32,
        _address: &str,
    ) -> Result<Vec<String>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..blocks_number).map(|i| format!("{:064x}", i)).collect())
    }
}

#[derive(Default)]
pub struct MockAddressIndex {
    pub calls: AtomicUsize,
}

impl MockAddressIndex {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressIndex for MockAddressIndex {
    async fn get_address_summary(
        &self,
        _addresses: &[String],
        no_tx_list: bool,
        _paging: PagingOptions,
    ) -> Result<AddressSummary, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AddressSummary {
            balance: 5000,
            total_received: 9000,
            total_sent: 4000,
            unconfirmed_balance: 0,
            transactions: if no_tx_list {
                None
            } else {
                Some(vec!["ab".repeat(32)])
            },
            extra: Default::default(),
        })
    }

    async fn get_transactions_by_address(
        &self,
        _addresses: &[String],
        _paging: PagingOptions,
    ) -> Result<Vec<Value>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![json!({"txid": "ab".repeat(32)})])
    }

    async fn get_utxo(
        &self,
        addresses: &[String],
        _paging: PagingOptions,
    ) -> Result<UtxoPage, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UtxoPage {
            total_items: 1,
            from: 0,
            to: 1,
            items: vec![Utxo {
                address: addresses[0].clone(),
                txid: "ab".repeat(32),
                output_index: 0,
                script: "76a914".into(),
                satoshis: 100_000,
                height: 42,
            }],
        })
    }
}

#[derive(Default)]
pub struct MockSpv {
    pub calls: AtomicUsize,
}

impl MockSpv {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpvService for MockSpv {
    async fn load_bloom_filter(&self, _filter: &BloomFilter) -> Result<bool, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn add_to_bloom_filter(
        &self,
        _original_filter: &BloomFilter,
        _element: &[u8],
    ) -> Result<bool, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn clear_bloom_filter(&self, _filter: &BloomFilter) -> Result<bool, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn get_spv_data(&self, _filter: &BloomFilter) -> Result<SpvData, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SpvData {
            hashes: vec![],
            merkle_blocks: vec![],
        })
    }

    async fn find_data_for_block(
        &self,
        _filter: &BloomFilter,
        block_hash: &str,
    ) -> Result<BlockSpvData, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BlockSpvData {
            merkle_block: block_hash.into(),
            transactions: vec![],
        })
    }
}

#[derive(Default)]
pub struct MockStorage {
    pub calls: AtomicUsize,
}

impl MockStorage {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PacketStorage for MockStorage {
    async fn store_packet(&self, _packet: &[u8]) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockConsensus {
    pub calls: AtomicUsize,
    pub check_code: u32,
    pub deliver_code: u32,
}

impl Default for MockConsensus {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            check_code: 0,
            deliver_code: 0,
        }
    }
}

impl MockConsensus {
    pub fn rejecting(check_code: u32, deliver_code: u32) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            check_code,
            deliver_code,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsensusBroadcast for MockConsensus {
    async fn broadcast_tx_commit(
        &self,
        _tx: &[u8],
    ) -> Result<BroadcastTxCommitResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BroadcastTxCommitResult {
            check_tx: AbciResponse {
                code: self.check_code,
                log: Some("check phase".into()),
                data: None,
            },
            deliver_tx: AbciResponse {
                code: self.deliver_code,
                log: Some("deliver phase".into()),
                data: None,
            },
            hash: "AB".into(),
            height: Some("10".into()),
        })
    }

    async fn abci_query(&self, _path: &str, _data: &[u8]) -> Result<AbciQueryResult, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AbciQueryResult {
            code: 0,
            log: None,
            value: Some("aWRlbnRpdHk=".into()),
        })
    }
}

/// Handles onto the mocks behind a [`Backends`] value.
pub struct MockHandles {
    pub core: Arc<MockCore>,
    pub address_index: Arc<MockAddressIndex>,
    pub storage: Arc<MockStorage>,
    pub consensus: Arc<MockConsensus>,
    pub spv: Option<Arc<MockSpv>>,
}

/// Build mock backends, optionally with the SPV service attached.
pub fn mock_backends(with_spv: bool) -> (Backends, MockHandles) {
    mock_backends_with_consensus(with_spv, MockConsensus::default())
}

/// Build mock backends with a specific consensus behavior.
pub fn mock_backends_with_consensus(
    with_spv: bool,
    consensus: MockConsensus,
) -> (Backends, MockHandles) {
    let core = Arc::new(MockCore::default());
    let address_index = Arc::new(MockAddressIndex::default());
    let storage = Arc::new(MockStorage::default());
    let consensus = Arc::new(consensus);
    let spv = with_spv.then(|| Arc::new(MockSpv::default()));

    let backends = Backends {
        core: Arc::clone(&core) as _,
        address_index: Arc::clone(&address_index) as _,
        storage: Arc::clone(&storage) as _,
        consensus: Arc::clone(&consensus) as _,
        spv: spv.clone().map(|s| s as Arc<dyn SpvService>),
    };

    let handles = MockHandles {
        core,
        address_index,
        storage,
        consensus,
        spv,
    };

    (backends, handles)
}
