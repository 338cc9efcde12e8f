use clap::Parser;
use p2p_order_history::config::DEFAULT_CONFIG_PATH;
use p2p_order_history::logging::{self, LOG_FILE};
use p2p_order_history::{tui, ReportShell};
use std::sync::Arc;

/// Summarise Binance P2P order history and export it to CSV.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON file holding api_key and secret_key.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Run once for this period and print the summary instead of opening the UI
    /// ("today", "yesterday", "last 7 days" or "last 30 days").
    #[arg(long)]
    period: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(LOG_FILE) {
        eprintln!("Logging to {} is unavailable: {:#}", LOG_FILE, e);
        env_logger::init();
    }

    let shell = ReportShell::from_config_file(&cli.config);

    match cli.period {
        Some(period) => {
            let outcome = shell.submit(&period).await;
            if let Some(summary) = &outcome.summary {
                print!("{}", summary);
            }
            for message in &outcome.errors {
                eprintln!("Error: {}", message);
            }
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        None => tui::run(Arc::new(shell)).await?,
    }

    Ok(())
}
