use serde::{Deserialize, Serialize};
use std::fs;
use anyhow::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Credentials and request settings, read once at startup.
///
/// Only `api_key` and `secret_key` are required in the file; the rest fall
/// back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: String,
    pub secret_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    /// Upper bound on pages fetched in one run (100 records each).
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

fn default_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_max_pages() -> u32 {
    1000
}

fn default_output_path() -> String {
    "order_history.csv".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
            max_pages: default_max_pages(),
            output_path: default_output_path(),
        }
    }
}

impl Config {
    /// Loads and validates the config file.
    ///
    /// A missing file is replaced by a template with empty credentials, and
    /// loading still fails until the keys are filled in.
    pub fn load_from_file(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            Self::default().save_to_file(path)?;
            log::warn!("Created template config file at {}", path);
            return Err(anyhow::anyhow!(
                "config file {} was missing; fill in api_key and secret_key",
                path
            ));
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("api_key cannot be empty"));
        }

        if self.secret_key.trim().is_empty() {
            return Err(anyhow::anyhow!("secret_key cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("base_url must be an http(s) URL"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("request_timeout_seconds must be greater than 0"));
        }

        if self.max_pages == 0 {
            return Err(anyhow::anyhow!("max_pages must be greater than 0"));
        }

        if self.output_path.trim().is_empty() {
            return Err(anyhow::anyhow!("output_path cannot be empty"));
        }

        Ok(())
    }
}
