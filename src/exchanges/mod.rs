pub mod binance;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::period::TimeRange;

/// Number of records the history endpoint returns on a full page.
pub const PAGE_SIZE: usize = 100;

pub const STATUS_CANCELLED: &str = "CANCELLED";
pub const STATUS_CANCELLED_BY_SYSTEM: &str = "CANCELLED_BY_SYSTEM";

/// One P2P trade as returned by the order-history endpoint.
///
/// Field order is the column order of the CSV report. Values are kept as the
/// exchange sent them; numbers are carried in their textual form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub adv_no: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trade_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub asset: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fiat: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fiat_symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub create_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub commission: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub counter_part_nick_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub advertisement_role: Option<String>,
}

impl OrderRecord {
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.order_status.as_deref(),
            Some(STATUS_CANCELLED) | Some(STATUS_CANCELLED_BY_SYSTEM)
        )
    }
}

// The API mixes strings and numbers (createTime is an integer, commission a
// string), so every field accepts either and keeps the text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// A single page of order history.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    pub orders: Vec<OrderRecord>,
    /// Entries the exchange sent, including ones that could not be read as
    /// records. Compared against `PAGE_SIZE` to detect the last page.
    pub received: usize,
}

impl HistoryPage {
    /// Builds a page from a decoded response body.
    ///
    /// A missing or non-array `data` field yields an empty page.
    pub fn from_body(body: &Value) -> Self {
        let entries = match body.get("data").and_then(|d| d.as_array()) {
            Some(entries) => entries,
            None => return Self::default(),
        };

        let mut orders = Vec::with_capacity(entries.len());
        for entry in entries {
            match OrderRecord::deserialize(entry) {
                Ok(order) if entry.is_object() => orders.push(order),
                Ok(_) => log::warn!("Skipping non-object history entry: {}", entry),
                Err(e) => log::warn!("Skipping unreadable history entry: {}", e),
            }
        }

        Self {
            orders,
            received: entries.len(),
        }
    }

    pub fn is_last(&self) -> bool {
        self.received < PAGE_SIZE
    }
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Signature error: {0}")]
    SignatureError(String),
}

/// Anything that can serve pages of P2P order history.
#[async_trait]
pub trait OrderHistorySource: Send + Sync {
    async fn fetch_page(
        &self,
        range: Option<TimeRange>,
        page: u32,
    ) -> Result<HistoryPage, ExchangeError>;
}
