// =============================================================================
// Runtime Configuration — universe, schedule, output and serving settings
// =============================================================================
//
// Every tunable of the service lives here.  All fields carry
// `#[serde(default)]` so that a partial (or empty) JSON file still loads, and
// a handful of environment variables override the file at startup.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_symbols() -> Vec<String> {
    [
        "TCS.NS",
        "RELIANCE.NS",
        "INFY.NS",
        "HDFC.NS",
        "ICICIBANK.NS",
        "AXISBANK.NS",
        "SBIN.NS",
        "HDFCBANK.NS",
        "LT.NS",
        "BAJFINANCE.NS",
        "ITC.NS",
        "ONGC.NS",
        "TATASTEEL.NS",
        "BHARTIARTL.NS",
        "WIPRO.NS",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_display_suffix() -> String {
    ".NS".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_history_range() -> String {
    "6mo".to_string()
}

fn default_schedule_hour() -> u32 {
    20
}

fn default_schedule_minute() -> u32 {
    50
}

fn default_output_path() -> PathBuf {
    PathBuf::from("templates/stock_data.html")
}

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_data_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the Optimist Trader service.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Universe ------------------------------------------------------------

    /// Tickers analysed on every run, in display order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Exchange suffix stripped from tickers for display (e.g. ".NS").
    #[serde(default = "default_display_suffix")]
    pub display_suffix: String,

    /// Prefix for price cells in the rendered table.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    // --- Data source ---------------------------------------------------------

    /// History window requested per ticker.
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Chart API base URL.
    #[serde(default = "default_data_base_url")]
    pub data_base_url: String,

    // --- Schedule ------------------------------------------------------------

    /// Local hour (0-23) of the daily run.
    #[serde(default = "default_schedule_hour")]
    pub schedule_hour: u32,

    /// Local minute (0-59) of the daily run.
    #[serde(default = "default_schedule_minute")]
    pub schedule_minute: u32,

    /// Run once immediately at startup so the page has content.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,

    // --- Output & serving ----------------------------------------------------

    /// File the rendered table fragment is written to after each run.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            display_suffix: default_display_suffix(),
            currency_symbol: default_currency_symbol(),
            history_range: default_history_range(),
            data_base_url: default_data_base_url(),
            schedule_hour: default_schedule_hour(),
            schedule_minute: default_schedule_minute(),
            run_on_startup: true,
            output_path: default_output_path(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `OPTIMIST_*` overrides from an environment lookup.
    ///
    /// Takes the lookup as a closure so tests do not touch the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(syms) = lookup("OPTIMIST_SYMBOLS") {
            let symbols: Vec<String> = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !symbols.is_empty() {
                self.symbols = symbols;
            }
        }
        if let Some(addr) = lookup("OPTIMIST_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(path) = lookup("OPTIMIST_OUTPUT_PATH") {
            self.output_path = PathBuf::from(path);
        }
    }

    /// Local wall-clock time of the daily run.
    pub fn schedule_time(&self) -> Result<NaiveTime> {
        NaiveTime::from_hms_opt(self.schedule_hour, self.schedule_minute, 0).with_context(|| {
            format!(
                "invalid schedule time {:02}:{:02}",
                self.schedule_hour, self.schedule_minute
            )
        })
    }
}
