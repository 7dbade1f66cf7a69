//! Cart and order types plus the order persistence seam.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cart line as submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub target_currency: Option<String>,
}

/// Order creation payload. `total` is accepted for compatibility with older
/// clients but always replaced by the server-side price.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub customer_id: i64,
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub target_currency: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
}

/// An order after pricing, as handed to the [`OrderStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedOrder {
    pub customer_id: i64,
    pub items: Vec<CartLine>,
    pub target_currency: String,
    pub total: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: String,
    pub total: i64,
    pub currency: String,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists the order and returns its opaque id.
    async fn save(&self, order: FinalizedOrder) -> Result<String>;
    async fn get(&self, order_id: &str) -> Option<FinalizedOrder>;
}
