//! Platform commands backed by the consensus node.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::commands::{decode_params, Command, CommandHandler, CommandRegistry, HandlerError};
use crate::domain::error::RpcError;
use crate::domain::schema::{FieldKind, Schema};
use crate::ports::outbound::ConsensusBroadcast;
use crate::transition::{BroadcastError, BroadcastPhase};

/// Register the platform command set.
pub fn register(registry: &mut CommandRegistry, consensus: Arc<dyn ConsensusBroadcast>) {
    registry.register(Command::new(
        "applyStateTransition",
        Schema::object().required("stateTransition", FieldKind::Base64String),
        Arc::new(ApplyStateTransition {
            consensus: Arc::clone(&consensus),
        }),
    ));

    registry.register(Command::new(
        "getIdentity",
        Schema::object().required("id", FieldKind::String),
        Arc::new(GetIdentity { consensus }),
    ));
}

/// applyStateTransition - submit a platform state transition and decode
/// both acceptance phases
struct ApplyStateTransition {
    consensus: Arc<dyn ConsensusBroadcast>,
}

#[async_trait]
impl CommandHandler for ApplyStateTransition {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            #[serde(rename = "stateTransition")]
            state_transition: String,
        }

        let p: Params = decode_params(params)?;
        let transition = BASE64.decode(&p.state_transition).map_err(|_| {
            RpcError::invalid_params("params.stateTransition should be base64 string")
        })?;

        let result = self.consensus.broadcast_tx_commit(&transition).await?;

        // Check-phase verdict first; a deliver result after a failed check
        // is not authoritative.
        for (phase, response) in [
            (BroadcastPhase::Check, &result.check_tx),
            (BroadcastPhase::Deliver, &result.deliver_tx),
        ] {
            if !response.is_ok() {
                return Err(HandlerError::Broadcast(BroadcastError::Rejected {
                    phase,
                    code: response.code,
                    log: response.log.clone().unwrap_or_default(),
                    data: response.data.clone(),
                }));
            }
        }

        Ok(json!(true))
    }
}

/// getIdentity - read identity bytes through an abci_query at `/identity`
struct GetIdentity {
    consensus: Arc<dyn ConsensusBroadcast>,
}

#[async_trait]
impl CommandHandler for GetIdentity {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        #[derive(Deserialize)]
        struct Params {
            id: String,
        }

        let p: Params = decode_params(params)?;
        let result = self
            .consensus
            .abci_query("/identity", p.id.as_bytes())
            .await?;

        if result.code != 0 {
            return Err(HandlerError::Client(RpcError::with_data(
                crate::domain::error::codes::RESOURCE_NOT_FOUND,
                format!(
                    "Identity not found: {}",
                    result.log.clone().unwrap_or_default()
                ),
                json!({"code": result.code}),
            )));
        }

        // The query value is already base64; pass it through as the result.
        Ok(json!(result.value.unwrap_or_default()))
    }
}
