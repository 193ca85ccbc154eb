//! Insight address-index adapter.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::types::{AddressSummary, PagingOptions, Utxo, UtxoPage};
use crate::ports::outbound::{AddressIndex, BackendError};

/// `AddressIndex` over the Insight REST API.
pub struct InsightClient {
    http: reqwest::Client,
    base_url: String,
}

impl InsightClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "address index call");

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Insight reports failures as plain-text bodies.
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Rpc {
                code: crate::domain::error::codes::SERVER_ERROR,
                message: if message.is_empty() {
                    format!("address index returned HTTP {}", status.as_u16())
                } else {
                    message
                },
                data: None,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn paging_query(paging: &PagingOptions) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(from) = paging.from {
        query.push(("from", from.to_string()));
    }
    if let Some(to) = paging.to {
        query.push(("to", to.to_string()));
    }
    if let Some(from_height) = paging.from_height {
        query.push(("fromHeight", from_height.to_string()));
    }
    if let Some(to_height) = paging.to_height {
        query.push(("toHeight", to_height.to_string()));
    }
    query
}

/// Transaction listings come back as `{totalItems, from, to, items}` or, on
/// older deployments, a bare array.
fn extract_items(value: Value) -> Result<Vec<Value>, BackendError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(BackendError::Decode(
                "transaction listing has no items array".into(),
            )),
        },
        _ => Err(BackendError::Decode(
            "unexpected transaction listing shape".into(),
        )),
    }
}

/// UTXO listings are paged objects on current deployments and bare arrays on
/// older ones; normalize both to a page.
fn utxo_page(value: Value, paging: &PagingOptions) -> Result<UtxoPage, BackendError> {
    if value.is_object() {
        return serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()));
    }

    let items: Vec<Utxo> =
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))?;
    let from = paging.from.unwrap_or(0);
    Ok(UtxoPage {
        total_items: items.len() as u64,
        from,
        to: from + items.len() as u32,
        items,
    })
}

#[async_trait]
impl AddressIndex for InsightClient {
    async fn get_address_summary(
        &self,
        addresses: &[String],
        no_tx_list: bool,
        paging: PagingOptions,
    ) -> Result<AddressSummary, BackendError> {
        let mut query = paging_query(&paging);
        if no_tx_list {
            query.push(("noTxList", "1".to_string()));
        }

        let value = self
            .get_json(&format!("/addr/{}", addresses.join(",")), &query)
            .await?;
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn get_transactions_by_address(
        &self,
        addresses: &[String],
        paging: PagingOptions,
    ) -> Result<Vec<Value>, BackendError> {
        let value = self
            .get_json(
                &format!("/addrs/{}/txs", addresses.join(",")),
                &paging_query(&paging),
            )
            .await?;
        extract_items(value)
    }

    async fn get_utxo(
        &self,
        addresses: &[String],
        paging: PagingOptions,
    ) -> Result<UtxoPage, BackendError> {
        let value = self
            .get_json(
                &format!("/addrs/{}/utxo", addresses.join(",")),
                &paging_query(&paging),
            )
            .await?;
        utxo_page(value, &paging)
    }
}
