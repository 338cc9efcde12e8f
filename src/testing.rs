use crate::exchanges::{ExchangeError, HistoryPage, OrderHistorySource, OrderRecord};
use crate::period::TimeRange;
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory history source that replays scripted pages and records every
/// request it receives.
pub struct ScriptedSource {
    pages: Vec<Vec<OrderRecord>>,
    fail_on: Option<u32>,
    panic_on: Option<u32>,
    requests: Mutex<Vec<(u32, Option<TimeRange>)>>,
}

impl ScriptedSource {
    pub fn new(pages: Vec<Vec<OrderRecord>>) -> Self {
        Self {
            pages,
            fail_on: None,
            panic_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Pages of blank records with the given sizes.
    pub fn with_sizes(sizes: &[usize]) -> Self {
        Self::new(
            sizes
                .iter()
                .map(|&n| vec![OrderRecord::default(); n])
                .collect(),
        )
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.fail_on = Some(page);
        self
    }

    pub fn panicking_on(mut self, page: u32) -> Self {
        self.panic_on = Some(page);
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }

    pub fn requested_ranges(&self) -> Vec<Option<TimeRange>> {
        self.requests.lock().unwrap().iter().map(|(_, r)| *r).collect()
    }
}

#[async_trait]
impl OrderHistorySource for ScriptedSource {
    async fn fetch_page(
        &self,
        range: Option<TimeRange>,
        page: u32,
    ) -> Result<HistoryPage, ExchangeError> {
        self.requests.lock().unwrap().push((page, range));

        if self.panic_on == Some(page) {
            panic!("scripted panic on page {}", page);
        }
        if self.fail_on == Some(page) {
            return Err(ExchangeError::NetworkError("connection reset".to_string()));
        }

        let orders = self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(HistoryPage {
            received: orders.len(),
            orders,
        })
    }
}

pub fn order(asset: &str, side: &str, amount: &str, total: &str, status: &str) -> OrderRecord {
    OrderRecord {
        asset: Some(asset.to_string()),
        trade_type: Some(side.to_string()),
        amount: Some(amount.to_string()),
        total_price: Some(total.to_string()),
        order_status: Some(status.to_string()),
        ..Default::default()
    }
}
