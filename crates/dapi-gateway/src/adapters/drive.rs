//! Drive packet-storage adapter.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::adapters::http::JsonRpcHttpClient;
use crate::ports::outbound::{BackendError, PacketStorage};

/// `PacketStorage` over the Drive service's JSON-RPC interface.
pub struct DriveStorageClient {
    rpc: JsonRpcHttpClient,
}

impl DriveStorageClient {
    pub fn new(rpc: JsonRpcHttpClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl PacketStorage for DriveStorageClient {
    async fn store_packet(&self, packet: &[u8]) -> Result<(), BackendError> {
        // Drive keys the packet by its own content hash; the reply value is
        // not needed here.
        let _: Value = self
            .rpc
            .call("addSTPacket", json!({"packet": hex::encode(packet)}))
            .await?;
        Ok(())
    }
}
