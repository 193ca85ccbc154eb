//! Ports: trait boundaries between the gateway and its collaborators.

pub mod outbound;

pub use outbound::{
    AbciQueryResult, AbciResponse, AddressIndex, BackendError, BroadcastTxCommitResult,
    ConsensusBroadcast, CoreRpc, PacketStorage, SpvService,
};
