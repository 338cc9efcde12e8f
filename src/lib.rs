pub mod config;
pub mod exchanges;
pub mod history;
pub mod logging;
pub mod period;
pub mod report;
pub mod tui;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use crate::exchanges::{binance::BinanceP2pClient, OrderHistorySource};
use crate::history::{AggregateError, HistoryError};
use crate::period::{Period, PeriodError};
use log::{debug, error, info};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("invalid period: {0}")]
    InvalidPeriod(#[from] PeriodError),

    #[error("API credentials are not configured")]
    NotConfigured,

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("failed to save CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to summarise orders: {0}")]
    Aggregate(#[from] AggregateError),
}

impl ReportError {
    /// Text shown to the user. Never includes error detail; that goes to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::InvalidPeriod(PeriodError::Empty) => "Please enter the period of time.",
            ReportError::InvalidPeriod(PeriodError::Unrecognized(_)) => {
                "Invalid period of time entered."
            }
            ReportError::NotConfigured => {
                "API keys could not be loaded. Please check the log file for details."
            }
            ReportError::History(_) => {
                "An error occurred while fetching trades. Please check the log file for details."
            }
            ReportError::Csv(_) => {
                "An error occurred while saving the CSV file. Please check the log file for details."
            }
            ReportError::Aggregate(_) => {
                "An error occurred while displaying results. Please check the log file for details."
            }
        }
    }

    fn log(&self) {
        match self {
            ReportError::InvalidPeriod(e) => info!("Rejected period input: {}", e),
            // The fetcher already logged the request failure.
            ReportError::History(HistoryError::Fetch { .. }) => debug!("Run aborted: {}", self),
            _ => error!("{}", self),
        }
    }
}

/// Result of one run that got past fetching. The CSV and summary stages fail
/// independently of each other.
#[derive(Debug)]
pub struct Report {
    pub orders: usize,
    pub csv: Result<usize, ReportError>,
    pub summary: Result<String, ReportError>,
}

/// What the display surface should show after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Replaces the output area when present.
    pub summary: Option<String>,
    pub errors: Vec<&'static str>,
}

impl Outcome {
    /// Outcome for a run that ended without producing a result.
    pub fn aborted() -> Self {
        Self {
            summary: None,
            errors: vec!["An error occurred. Please check the log file for details."],
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the fetch, CSV and summary pipeline for one period selection.
pub struct ReportShell<S> {
    source: Option<S>,
    output_path: PathBuf,
    max_pages: u32,
}

impl ReportShell<BinanceP2pClient> {
    /// Builds a shell from the config file. Configuration problems are logged
    /// and leave the shell unconfigured, so every run reports them.
    pub fn from_config_file(path: &str) -> Self {
        let config = match Config::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Error occurred during loading API keys from {}: {}", path, e);
                return Self::unconfigured(&Config::default());
            }
        };

        match BinanceP2pClient::new(&config) {
            Ok(client) => Self::new(client, &config),
            Err(e) => {
                error!("Failed to create exchange client: {}", e);
                Self::unconfigured(&config)
            }
        }
    }
}

impl<S: OrderHistorySource> ReportShell<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source: Some(source),
            output_path: PathBuf::from(&config.output_path),
            max_pages: config.max_pages,
        }
    }

    pub fn unconfigured(config: &Config) -> Self {
        Self {
            source: None,
            output_path: PathBuf::from(&config.output_path),
            max_pages: config.max_pages,
        }
    }

    pub fn output_path(&self) -> &std::path::Path {
        &self.output_path
    }

    /// Validates `input`, fetches every page for the period, then writes the
    /// CSV and builds the summary.
    ///
    /// Nothing is fetched for invalid input, and nothing is written when any
    /// page fails.
    pub async fn generate(&self, input: &str) -> Result<Report, ReportError> {
        let period: Period = input.parse()?;
        let source = self.source.as_ref().ok_or(ReportError::NotConfigured)?;

        let range = period.calculate_timestamps();
        info!("Fetching P2P order history for {} ({:?})", period, range);

        let orders = history::collect_orders(source, Some(range), self.max_pages).await?;

        let csv = report::write_csv(&orders, &self.output_path).map_err(ReportError::from);
        let summary = history::aggregate(&orders)
            .map(|totals| report::format_summary(&totals))
            .map_err(ReportError::from);

        Ok(Report {
            orders: orders.len(),
            csv,
            summary,
        })
    }

    /// Runs the pipeline and turns every failure into a user-facing message.
    pub async fn submit(&self, input: &str) -> Outcome {
        let report = match self.generate(input).await {
            Ok(report) => report,
            Err(e) => {
                e.log();
                return Outcome {
                    summary: None,
                    errors: vec![e.user_message()],
                };
            }
        };

        let mut outcome = Outcome::default();

        match report.csv {
            Ok(rows) => info!("Wrote {} orders to {}", rows, self.output_path.display()),
            Err(e) => {
                e.log();
                outcome.errors.push(e.user_message());
            }
        }

        match report.summary {
            Ok(text) => outcome.summary = Some(text),
            Err(e) => {
                e.log();
                outcome.errors.push(e.user_message());
            }
        }

        outcome
    }
}
