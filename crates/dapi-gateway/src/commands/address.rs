//! Commands backed by the address index.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::commands::{decode_params, Command, CommandHandler, CommandRegistry, HandlerError};
use crate::domain::schema::{FieldKind, Schema};
use crate::domain::types::{AddressSelector, PagingOptions};
use crate::ports::outbound::AddressIndex;

/// Paging window limit for transaction listings.
pub const MAX_TRANSACTION_SPAN: i64 = 50;
/// Paging window limit for UTXO listings.
pub const MAX_UTXO_SPAN: i64 = 1000;

fn address_schema(max_span: i64) -> Schema {
    Schema::object()
        .required("address", FieldKind::AddressList)
        .optional("from", FieldKind::integer_min(0))
        .optional("to", FieldKind::integer_min(0))
        .optional("fromHeight", FieldKind::integer_min(0))
        .optional("toHeight", FieldKind::integer_min(0))
        .span("from", "to", max_span)
}

/// Register the address-index commands.
pub fn register(registry: &mut CommandRegistry, index: Arc<dyn AddressIndex>) {
    registry.register(Command::new(
        "getAddressSummary",
        address_schema(MAX_TRANSACTION_SPAN).optional("noTxList", FieldKind::Boolean),
        Arc::new(GetAddressSummary {
            index: Arc::clone(&index),
        }),
    ));

    registry.register(Command::new(
        "getTransactionsByAddress",
        address_schema(MAX_TRANSACTION_SPAN),
        Arc::new(GetTransactionsByAddress {
            index: Arc::clone(&index),
        }),
    ));

    registry.register(Command::new(
        "getUTXO",
        address_schema(MAX_UTXO_SPAN),
        Arc::new(GetUtxo { index }),
    ));
}

#[derive(Deserialize)]
struct AddressParams {
    address: AddressSelector,
    #[serde(rename = "noTxList", default)]
    no_tx_list: Option<bool>,
    #[serde(default)]
    from: Option<u32>,
    #[serde(default)]
    to: Option<u32>,
    #[serde(rename = "fromHeight", default)]
    from_height: Option<u32>,
    #[serde(rename = "toHeight", default)]
    to_height: Option<u32>,
}

impl AddressParams {
    fn paging(&self) -> PagingOptions {
        PagingOptions {
            from: self.from,
            to: self.to,
            from_height: self.from_height,
            to_height: self.to_height,
        }
    }
}

/// getAddressSummary - balances and transaction list for addresses
struct GetAddressSummary {
    index: Arc<dyn AddressIndex>,
}

#[async_trait]
impl CommandHandler for GetAddressSummary {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let p: AddressParams = decode_params(params)?;
        let summary = self
            .index
            .get_address_summary(
                &p.address.as_vec(),
                p.no_tx_list.unwrap_or(false),
                p.paging(),
            )
            .await?;
        serde_json::to_value(summary)
            .map_err(|e| HandlerError::Internal(format!("summary serialization: {e}")))
    }
}

/// getTransactionsByAddress - paged transaction listing
struct GetTransactionsByAddress {
    index: Arc<dyn AddressIndex>,
}

#[async_trait]
impl CommandHandler for GetTransactionsByAddress {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let p: AddressParams = decode_params(params)?;
        let transactions = self
            .index
            .get_transactions_by_address(&p.address.as_vec(), p.paging())
            .await?;
        Ok(json!(transactions))
    }
}

/// getUTXO - paged unspent output listing
struct GetUtxo {
    index: Arc<dyn AddressIndex>,
}

#[async_trait]
impl CommandHandler for GetUtxo {
    #[instrument(skip(self, params))]
    async fn call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let p: AddressParams = decode_params(params)?;
        let page = self.index.get_utxo(&p.address.as_vec(), p.paging()).await?;
        serde_json::to_value(page)
            .map_err(|e| HandlerError::Internal(format!("utxo serialization: {e}")))
    }
}
