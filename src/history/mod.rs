use crate::exchanges::{ExchangeError, OrderHistorySource, OrderRecord};
use crate::period::TimeRange;
use indexmap::IndexMap;
use log::{info, warn};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("fetching page {page} failed: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: ExchangeError,
    },

    #[error("stopped after {0} full pages without reaching the end of the history")]
    PageLimitExceeded(u32),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregateError {
    #[error("order {order} is missing field {field}")]
    MissingField { order: String, field: &'static str },

    #[error("order {order} has non-numeric {field}: {value:?}")]
    InvalidNumber {
        order: String,
        field: &'static str,
        value: String,
    },

    #[error("order {order} pushes the {field} total past the decimal range")]
    Overflow { order: String, field: &'static str },
}

/// Fetches every page of history in `range`, starting at page 1.
///
/// Stops at the first page with fewer than `PAGE_SIZE` entries. Any fetch
/// failure aborts the whole run, as does needing more than `max_pages` pages.
pub async fn collect_orders<S: OrderHistorySource + ?Sized>(
    source: &S,
    range: Option<TimeRange>,
    max_pages: u32,
) -> Result<Vec<OrderRecord>, HistoryError> {
    let mut orders = Vec::new();
    let mut page = 1;

    loop {
        if page > max_pages {
            warn!("Order history exceeded {} pages, aborting", max_pages);
            return Err(HistoryError::PageLimitExceeded(max_pages));
        }

        let history = source
            .fetch_page(range, page)
            .await
            .map_err(|e| HistoryError::Fetch { page, source: e })?;

        let last = history.is_last();
        orders.extend(history.orders);

        if last {
            break;
        }
        page += 1;
    }

    info!("Fetched {} orders across {} pages", orders.len(), page);
    Ok(orders)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTotals {
    pub buy: Decimal,
    pub sell: Decimal,
}

impl SideTotals {
    /// Adds `value` to one side. Returns `None` and leaves the totals as
    /// they were when the sum does not fit in a `Decimal`.
    fn checked_add(&mut self, side: Side, value: Decimal) -> Option<()> {
        let total = match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        };
        *total = total.checked_add(value)?;
        Some(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Buy,
    Sell,
}

/// Completed-trade totals, with assets in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub assets: IndexMap<String, SideTotals>,
    pub fiat: SideTotals,
}

/// Sums amounts per asset and fiat value per side, skipping cancelled orders
/// and trade types other than BUY and SELL.
pub fn aggregate(orders: &[OrderRecord]) -> Result<Totals, AggregateError> {
    let mut totals = Totals::default();

    for order in orders {
        let asset = required(order, order.asset.as_deref(), "asset")?;
        let trade_type = required(order, order.trade_type.as_deref(), "tradeType")?;
        required(order, order.order_status.as_deref(), "orderStatus")?;

        if order.is_cancelled() {
            continue;
        }

        let side = match trade_type {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            _ => continue,
        };

        let amount = decimal(order, order.amount.as_deref(), "amount")?;
        let total_price = decimal(order, order.total_price.as_deref(), "totalPrice")?;

        totals
            .assets
            .entry(asset.to_string())
            .or_default()
            .checked_add(side, amount)
            .ok_or_else(|| overflow(order, "amount"))?;
        totals
            .fiat
            .checked_add(side, total_price)
            .ok_or_else(|| overflow(order, "totalPrice"))?;
    }

    Ok(totals)
}

fn order_label(order: &OrderRecord) -> String {
    order
        .order_number
        .clone()
        .unwrap_or_else(|| "<unnumbered>".to_string())
}

fn overflow(order: &OrderRecord, field: &'static str) -> AggregateError {
    AggregateError::Overflow {
        order: order_label(order),
        field,
    }
}

fn required<'a>(
    order: &OrderRecord,
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, AggregateError> {
    value.ok_or_else(|| AggregateError::MissingField {
        order: order_label(order),
        field,
    })
}

fn decimal(
    order: &OrderRecord,
    value: Option<&str>,
    field: &'static str,
) -> Result<Decimal, AggregateError> {
    let raw = required(order, value, field)?.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| AggregateError::InvalidNumber {
            order: order_label(order),
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::PAGE_SIZE;
    use crate::testing::{order, ScriptedSource};

    #[tokio::test]
    async fn test_pagination_stops_on_short_page() {
        let source = ScriptedSource::with_sizes(&[PAGE_SIZE, PAGE_SIZE, 37]);

        let orders = collect_orders(&source, None, 1000).await.unwrap();

        assert_eq!(orders.len(), 237);
        assert_eq!(source.requested_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let source = ScriptedSource::with_sizes(&[]);

        let orders = collect_orders(&source, None, 1000).await.unwrap();

        assert!(orders.is_empty());
        assert_eq!(source.requested_pages(), vec![1]);
    }

    #[tokio::test]
    async fn test_full_last_page_needs_one_more_request() {
        let source = ScriptedSource::with_sizes(&[PAGE_SIZE]);

        let orders = collect_orders(&source, None, 1000).await.unwrap();

        assert_eq!(orders.len(), PAGE_SIZE);
        assert_eq!(source.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let source = ScriptedSource::with_sizes(&[PAGE_SIZE, PAGE_SIZE, 10]).failing_on(2);

        let result = collect_orders(&source, None, 1000).await;

        assert!(matches!(result, Err(HistoryError::Fetch { page: 2, .. })));
        assert_eq!(source.requested_pages(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let source = ScriptedSource::with_sizes(&[PAGE_SIZE; 10]);

        let result = collect_orders(&source, None, 3).await;

        assert!(matches!(result, Err(HistoryError::PageLimitExceeded(3))));
        assert_eq!(source.requested_pages(), vec![1, 2, 3]);
    }

    #[test]
    fn test_cancelled_orders_are_skipped() {
        let orders = vec![
            order("BTC", "BUY", "1.5", "90000", "COMPLETED"),
            order("BTC", "SELL", "0.5", "30000", "CANCELLED"),
        ];

        let totals = aggregate(&orders).unwrap();

        let btc = totals.assets["BTC"];
        assert_eq!(btc.buy, Decimal::from_str("1.5").unwrap());
        assert_eq!(btc.sell, Decimal::ZERO);
        assert_eq!(totals.fiat.buy, Decimal::from(90000));
        assert_eq!(totals.fiat.sell, Decimal::ZERO);
    }

    #[test]
    fn test_totals_by_asset_and_side() {
        let orders = vec![
            order("USDT", "BUY", "100.50", "9045.00", "COMPLETED"),
            order("BTC", "SELL", "0.25", "15000", "COMPLETED"),
            order("USDT", "SELL", "40", "3640", "COMPLETED"),
            order("USDT", "BUY", "9.50", "855", "COMPLETED"),
            order("ETH", "BUY", "3", "9000", "CANCELLED_BY_SYSTEM"),
        ];

        let totals = aggregate(&orders).unwrap();

        let assets: Vec<&str> = totals.assets.keys().map(String::as_str).collect();
        assert_eq!(assets, vec!["USDT", "BTC"]);
        assert_eq!(totals.assets["USDT"].buy, Decimal::from(110));
        assert_eq!(totals.assets["USDT"].sell, Decimal::from(40));
        assert_eq!(totals.assets["BTC"].sell, Decimal::from_str("0.25").unwrap());
        assert_eq!(totals.fiat.buy, Decimal::from(9900));
        assert_eq!(totals.fiat.sell, Decimal::from(18640));
    }

    #[test]
    fn test_other_trade_types_are_ignored() {
        let orders = vec![order("BNB", "TRANSFER", "oops", "oops", "COMPLETED")];

        let totals = aggregate(&orders).unwrap();

        assert!(totals.assets.is_empty());
        assert_eq!(totals.fiat, SideTotals::default());
    }

    #[test]
    fn test_invalid_amount_is_an_error() {
        let mut bad = order("BTC", "BUY", "abc", "10", "COMPLETED");
        bad.order_number = Some("42".to_string());

        let err = aggregate(&[bad]).unwrap_err();

        assert_eq!(
            err,
            AggregateError::InvalidNumber {
                order: "42".to_string(),
                field: "amount",
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let mut bad = order("BTC", "BUY", "1", "10", "COMPLETED");
        bad.asset = None;

        assert!(matches!(
            aggregate(&[bad]),
            Err(AggregateError::MissingField { field: "asset", .. })
        ));
    }

    #[test]
    fn test_scientific_amounts() {
        let orders = vec![order("BTC", "BUY", "1e-5", "1", "COMPLETED")];

        let totals = aggregate(&orders).unwrap();

        assert_eq!(totals.assets["BTC"].buy, Decimal::from_str("0.00001").unwrap());
    }

    #[test]
    fn test_amount_overflow_is_an_error() {
        let max = Decimal::MAX.to_string();
        let mut second = order("USDT", "BUY", &max, "1", "COMPLETED");
        second.order_number = Some("7".to_string());
        let orders = vec![order("USDT", "BUY", &max, "1", "COMPLETED"), second];

        assert_eq!(
            aggregate(&orders),
            Err(AggregateError::Overflow {
                order: "7".to_string(),
                field: "amount",
            })
        );
    }

    #[test]
    fn test_fiat_overflow_is_an_error() {
        let max = Decimal::MAX.to_string();
        let orders = vec![
            order("BTC", "SELL", "1", &max, "COMPLETED"),
            order("ETH", "SELL", "1", &max, "COMPLETED"),
        ];

        assert!(matches!(
            aggregate(&orders),
            Err(AggregateError::Overflow { field: "totalPrice", .. })
        ));
    }
}
