// =============================================================================
// Run Pipeline — fetch and analyse the whole universe once
// =============================================================================
//
// Instruments are processed sequentially in universe order.  A failure for
// one instrument (fetch or computation) is logged, recorded in the report,
// and replaced by an all-unavailable record; the batch always completes with
// exactly one record per configured symbol.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app_state::{AppState, Published};
use crate::engine::{self, display_symbol};
use crate::market_data::PriceSource;
use crate::render;
use crate::runtime_config::RuntimeConfig;
use crate::types::IndicatorRecord;

/// Stage of the per-instrument work that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureStage {
    Fetch,
    Analysis,
}

/// An instrument whose record had to be replaced by an unavailable one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentFailure {
    pub symbol: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Outcome of one scheduled run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One record per configured symbol, in universe order.
    pub records: Vec<IndicatorRecord>,
    pub failures: Vec<InstrumentFailure>,
}

/// Fetch and analyse every configured symbol.
pub async fn run_once<S: PriceSource>(source: &S, config: &RuntimeConfig) -> RunReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, symbols = config.symbols.len(), "fetching stock data");

    let mut records = Vec::with_capacity(config.symbols.len());
    let mut failures = Vec::new();

    for ticker in &config.symbols {
        let display = display_symbol(ticker, &config.display_suffix);

        let bars = match source.fetch_history(ticker).await {
            Ok(bars) => bars,
            Err(e) => {
                error!(symbol = %ticker, error = %e, "failed to fetch history");
                failures.push(InstrumentFailure {
                    symbol: display.to_string(),
                    stage: FailureStage::Fetch,
                    message: e.to_string(),
                });
                records.push(IndicatorRecord::no_data(display));
                continue;
            }
        };

        if bars.is_empty() {
            warn!(symbol = %ticker, "no history returned");
        }

        match engine::analyze(display, &bars) {
            Ok(record) => records.push(record),
            Err(e) => {
                error!(symbol = %ticker, error = %e, "failed to compute indicators");
                failures.push(InstrumentFailure {
                    symbol: display.to_string(),
                    stage: FailureStage::Analysis,
                    message: e.to_string(),
                });
                records.push(IndicatorRecord::no_data(display));
            }
        }
    }

    let finished_at = Utc::now();
    info!(
        %run_id,
        records = records.len(),
        failures = failures.len(),
        elapsed_ms = (finished_at - started_at).num_milliseconds(),
        "stock data run complete"
    );

    RunReport {
        run_id,
        started_at,
        finished_at,
        records,
        failures,
    }
}

/// One full cycle: run, render, persist the table, publish for serving.
///
/// A failed file write is logged; the fresh report is still published.
pub async fn refresh<S: PriceSource>(source: &S, state: &AppState) -> u64 {
    let config = &state.runtime_config;
    let report = run_once(source, config).await;
    let published = Published::render(report, &config.currency_symbol);

    let output_path = config.output_path.clone();
    let table = published.table_html.clone();
    match tokio::task::spawn_blocking(move || render::write_atomic(&output_path, &table)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "failed to persist stock table"),
        Err(e) => error!(error = %e, "stock table writer task failed"),
    }

    let version = state.publish(published);
    info!(state_version = version, "stock data updated successfully");
    version
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::market_data::FetchError;
    use crate::types::{Metric, PriceBar, Signal};

    /// In-memory source: known symbols return their bars, `FAIL.NS` errors,
    /// anything else is empty.
    struct FakeSource {
        series: HashMap<String, Vec<PriceBar>>,
    }

    impl PriceSource for FakeSource {
        async fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceBar>, FetchError> {
            if symbol == "FAIL.NS" {
                return Err(FetchError::Api {
                    code: "Not Found".into(),
                    description: "No data found".into(),
                });
            }
            Ok(self.series.get(symbol).cloned().unwrap_or_default())
        }
    }

    fn rising(n: usize) -> Vec<PriceBar> {
        (1..=n)
            .map(|i| PriceBar {
                timestamp: i as i64 * 86_400,
                open: i as f64,
                close: i as f64 + 0.5,
            })
            .collect()
    }

    fn config(symbols: &[&str]) -> RuntimeConfig {
        RuntimeConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            ..RuntimeConfig::default()
        }
    }

    #[tokio::test]
    async fn one_record_per_symbol_in_order() {
        let mut series = HashMap::new();
        series.insert("TCS.NS".to_string(), rising(120));
        series.insert(
            "BAD.NS".to_string(),
            vec![PriceBar { timestamp: 0, open: -1.0, close: 5.0 }],
        );
        let source = FakeSource { series };

        let cfg = config(&["TCS.NS", "FAIL.NS", "EMPTY.NS", "BAD.NS"]);
        let report = run_once(&source, &cfg).await;

        let symbols: Vec<&str> = report.records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TCS", "FAIL", "EMPTY", "BAD"]);

        assert_eq!(report.records[0].signal, Signal::Buy);
        assert!(matches!(report.records[0].price, Metric::Value(_)));
        assert_eq!(report.records[1], IndicatorRecord::no_data("FAIL"));
        assert_eq!(report.records[2], IndicatorRecord::no_data("EMPTY"));
        assert_eq!(report.records[3], IndicatorRecord::no_data("BAD"));

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].symbol, "FAIL");
        assert_eq!(report.failures[0].stage, FailureStage::Fetch);
        assert_eq!(report.failures[1].symbol, "BAD");
        assert_eq!(report.failures[1].stage, FailureStage::Analysis);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn empty_series_is_not_a_failure() {
        let source = FakeSource { series: HashMap::new() };
        let report = run_once(&source, &config(&["HDFC.NS"])).await;
        assert_eq!(report.records, vec![IndicatorRecord::no_data("HDFC")]);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_yield_identical_records() {
        let mut series = HashMap::new();
        series.insert("INFY.NS".to_string(), rising(210));
        let source = FakeSource { series };
        let cfg = config(&["INFY.NS"]);

        let a = run_once(&source, &cfg).await;
        let b = run_once(&source, &cfg).await;
        assert_eq!(a.records, b.records);
        assert_ne!(a.run_id, b.run_id);
    }

    #[tokio::test]
    async fn refresh_writes_file_and_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("templates").join("stock_data.html");

        let mut series = HashMap::new();
        series.insert("TCS.NS".to_string(), rising(60));
        let source = FakeSource { series };

        let state = AppState::new(RuntimeConfig {
            output_path: output.clone(),
            ..config(&["TCS.NS", "HDFC.NS"])
        });

        assert_eq!(refresh(&source, &state).await, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        let latest = state.latest().unwrap();
        assert_eq!(written, latest.table_html);
        assert!(written.contains("<td>TCS</td>"));
        assert!(written.contains("<td>HDFC</td>"));
        assert_eq!(latest.report.records.len(), 2);
    }

    #[tokio::test]
    async fn refresh_publishes_even_when_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let output = dir.path().join("occupied");
        std::fs::create_dir(&output).unwrap();

        let source = FakeSource { series: HashMap::new() };
        let state = AppState::new(RuntimeConfig {
            output_path: output,
            ..config(&["TCS.NS"])
        });

        assert_eq!(refresh(&source, &state).await, 1);
        assert!(state.latest().is_some());
        assert!(!dir.path().join("occupied.tmp").exists());
    }
}
