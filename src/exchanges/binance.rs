use super::{ExchangeError, HistoryPage, OrderHistorySource};
use crate::config::Config;
use crate::period::TimeRange;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use log::{debug, error};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const ORDER_HISTORY_ENDPOINT: &str = "/sapi/v1/c2c/orderMatch/listUserOrderHistory";

/// Lowercase hex HMAC-SHA256 of `query_string` keyed with `secret`.
pub fn sign(query_string: &str, secret: &str) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::SignatureError(format!("Invalid secret key: {}", e)))?;
    mac.update(query_string.as_bytes());
    let result = mac.finalize();
    Ok(hex::encode(result.into_bytes()))
}

/// Unsigned query for one history page. Parameter order is part of what gets signed.
pub fn build_query(timestamp: i64, page: u32, range: Option<TimeRange>) -> String {
    let mut query = format!("timestamp={}&page={}", timestamp, page);
    if let Some(range) = range {
        query.push_str(&format!("&startTimestamp={}", range.start_ms));
        query.push_str(&format!("&endTimestamp={}", range.end_ms));
    }
    query
}

pub struct BinanceP2pClient {
    client: Client,
    api_key: String,
    secret_key: String,
    base_url: String,
}

impl BinanceP2pClient {
    pub fn new(config: &Config) -> Result<Self, ExchangeError> {
        if config.api_key.is_empty() || config.secret_key.is_empty() {
            return Err(ExchangeError::MissingCredentials(
                "api_key and secret_key must be set".to_string(),
            ));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn signed_url(&self, page: u32, range: Option<TimeRange>) -> Result<String, ExchangeError> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let query_string = build_query(timestamp, page, range);
        let signature = sign(&query_string, &self.secret_key)?;
        Ok(format!(
            "{}{}?{}&signature={}",
            self.base_url, ORDER_HISTORY_ENDPOINT, query_string, signature
        ))
    }

    async fn request_page(
        &self,
        range: Option<TimeRange>,
        page: u32,
    ) -> Result<HistoryPage, ExchangeError> {
        let url = self.signed_url(page, range)?;

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(format!("Failed to read body: {}", e)))?;

        parse_response(status, &body)
    }
}

/// Turns a history response into a page. Non-2xx statuses, bodies that are
/// not JSON and `"success": false` replies are all errors.
pub fn parse_response(status: StatusCode, body: &str) -> Result<HistoryPage, ExchangeError> {
    if !status.is_success() {
        return Err(ExchangeError::ApiError(format!("HTTP {}: {}", status, body)));
    }

    let data: Value = serde_json::from_str(body)
        .map_err(|e| ExchangeError::ParseError(format!("Failed to parse response: {}", e)))?;

    if data.get("success").and_then(|s| s.as_bool()) == Some(false) {
        return Err(ExchangeError::ApiError(format!("Request rejected: {}", body)));
    }

    Ok(HistoryPage::from_body(&data))
}

#[async_trait]
impl OrderHistorySource for BinanceP2pClient {
    async fn fetch_page(
        &self,
        range: Option<TimeRange>,
        page: u32,
    ) -> Result<HistoryPage, ExchangeError> {
        match self.request_page(range, page).await {
            Ok(history) => {
                debug!(
                    "{} page {}: {} entries",
                    ORDER_HISTORY_ENDPOINT, page, history.received
                );
                Ok(history)
            }
            Err(e) => {
                error!(
                    "API request failed ({}{}, page {}): {}",
                    self.base_url, ORDER_HISTORY_ENDPOINT, page, e
                );
                Err(e)
            }
        }
    }
}
