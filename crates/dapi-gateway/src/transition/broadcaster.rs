//! State transition broadcast flow.
//!
//! decode → verify packet hash → store packet → submit to the consensus
//! node → inspect check then deliver acceptance codes. Integrity failures
//! and rejection codes are terminal for the given input; nothing here
//! retries.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::hash::double_sha256_hex;
use crate::ports::outbound::{BackendError, ConsensusBroadcast, PacketStorage};
use crate::transition::header::{HeaderDecodeError, TransitionHeader};

/// Which broadcast phase rejected the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastPhase {
    Check,
    Deliver,
}

impl fmt::Display for BroadcastPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastPhase::Check => write!(f, "check"),
            BroadcastPhase::Deliver => write!(f, "deliver"),
        }
    }
}

/// Broadcast failures, in the order the flow can hit them.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("invalid transition header: {0}")]
    InvalidHeader(#[from] HeaderDecodeError),

    #[error("transition packet is required by the header")]
    PacketRequired,

    #[error("header does not reference a packet")]
    PacketNotExpected,

    #[error("packet hash mismatch: header expects {expected}, packet hashes to {actual}")]
    PacketHashMismatch { expected: String, actual: String },

    #[error("packet storage failed: {0}")]
    Storage(#[source] BackendError),

    #[error("broadcast failed: {0}")]
    Transport(#[source] BackendError),

    #[error("transition rejected during {phase} (code {code}): {log}")]
    Rejected {
        phase: BroadcastPhase,
        code: u32,
        log: String,
        data: Option<String>,
    },
}

/// Drives a two-part state transition through storage and consensus
/// submission.
pub struct TransitionBroadcaster {
    storage: Arc<dyn PacketStorage>,
    consensus: Arc<dyn ConsensusBroadcast>,
}

impl TransitionBroadcaster {
    pub fn new(storage: Arc<dyn PacketStorage>, consensus: Arc<dyn ConsensusBroadcast>) -> Self {
        Self { storage, consensus }
    }

    /// Broadcast a transition header with its optional data packet.
    ///
    /// Returns the header transaction id on success. The packet hash is
    /// verified before any side effect; a mismatch stores and broadcasts
    /// nothing.
    #[instrument(skip(self, raw_header, packet))]
    pub async fn broadcast(
        &self,
        raw_header: &[u8],
        packet: Option<&[u8]>,
    ) -> Result<String, BroadcastError> {
        let header = TransitionHeader::decode(raw_header)?;

        match (header.requires_packet(), packet) {
            (true, None) => return Err(BroadcastError::PacketRequired),
            (false, Some(_)) => return Err(BroadcastError::PacketNotExpected),
            _ => {}
        }

        if let Some(packet) = packet {
            let expected = header.packet_hash_hex();
            let actual = double_sha256_hex(packet);
            if expected != actual {
                return Err(BroadcastError::PacketHashMismatch { expected, actual });
            }

            self.storage
                .store_packet(packet)
                .await
                .map_err(BroadcastError::Storage)?;

            debug!(packet_len = packet.len(), "transition packet stored");
        }

        let result = self
            .consensus
            .broadcast_tx_commit(header.to_bytes())
            .await
            .map_err(BroadcastError::Transport)?;

        // Pre-check verdict comes first; a deliver result after a failed
        // check is not authoritative.
        for (phase, response) in [
            (BroadcastPhase::Check, &result.check_tx),
            (BroadcastPhase::Deliver, &result.deliver_tx),
        ] {
            if !response.is_ok() {
                return Err(BroadcastError::Rejected {
                    phase,
                    code: response.code,
                    log: response.log.clone().unwrap_or_default(),
                    data: response.data.clone(),
                });
            }
        }

        debug!(txid = %header.txid(), "transition committed");

        Ok(header.txid())
    }
}
