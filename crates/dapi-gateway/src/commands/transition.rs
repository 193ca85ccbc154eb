//! sendRawTransition - broadcast a two-part state transition.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::commands::{decode_params, Command, CommandHandler, CommandRegistry, HandlerError};
use crate::domain::error::RpcError;
use crate::domain::schema::{FieldKind, Schema};
use crate::ports::outbound::{ConsensusBroadcast, PacketStorage};
use crate::transition::TransitionBroadcaster;

/// Register the transition broadcast command.
pub fn register(
    registry: &mut CommandRegistry,
    storage: Arc<dyn PacketStorage>,
    consensus: Arc<dyn ConsensusBroadcast>,
) {
    registry.register(Command::new(
        "sendRawTransition",
        Schema::object()
            .required("rawTransitionHeader", FieldKind::hex())
            .optional("rawTransitionPacket", FieldKind::hex()),
        Arc::new(SendRawTransition {
            broadcaster: TransitionBroadcaster::new(storage, consensus),
        }),
    ));
}

/// sendRawTransition - header + optional packet, returns the header txid
struct SendRawTransition {
    broadcaster: TransitionBroadcaster,
}

#[async_trait]
impl CommandHandler for SendRawTransition {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "rawTransitionHeader")]
            raw_transition_header: String,
            #[serde(rename = "rawTransitionPacket", default)]
            raw_transition_packet: Option<String>,
        }

        let p: Params = decode_params(params)?;

        let header = hex::decode(&p.raw_transition_header).map_err(|_| {
            RpcError::invalid_params("params.rawTransitionHeader should be hex string")
        })?;

        let packet = p
            .raw_transition_packet
            .as_deref()
            .map(hex::decode)
            .transpose()
            .map_err(|_| {
                RpcError::invalid_params("params.rawTransitionPacket should be hex string")
            })?;

        let txid = self
            .broadcaster
            .broadcast(&header, packet.as_deref())
            .await?;

        Ok(json!(txid))
    }
}
