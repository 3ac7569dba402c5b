// =============================================================================
// Central Application State — Optimist Trader
// =============================================================================
//
// Ties the configuration to the most recently published report.  The run
// pipeline renders a report and hands it over through `publish`; the HTTP
// handlers only ever read the latest publication.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock around the latest publication, which is swapped as
//     a whole `Arc` so readers never hold the lock while serialising.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::pipeline::RunReport;
use crate::render;
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// Published report
// =============================================================================

/// A run report together with its rendered HTML.
#[derive(Debug, Clone)]
pub struct Published {
    pub report: RunReport,
    /// Table fragment, as persisted to the output file.
    pub table_html: String,
    /// Standalone page served at `/`.
    pub page_html: String,
}

impl Published {
    pub fn render(report: RunReport, currency: &str) -> Self {
        let table_html = render::render_table(&report.records, currency);
        let page_html = render::render_page(&table_html);
        Self {
            report,
            table_html,
            page_html,
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Shared application state handed to every async task via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every publish.
    pub state_version: AtomicU64,

    pub runtime_config: RuntimeConfig,

    latest: RwLock<Option<Arc<Published>>>,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            runtime_config: config,
            latest: RwLock::new(None),
        }
    }

    /// Replace the served report.  Returns the new state version.
    pub fn publish(&self, published: Published) -> u64 {
        *self.latest.write() = Some(Arc::new(published));
        self.state_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recent publication, if any run has completed.
    pub fn latest(&self) -> Option<Arc<Published>> {
        self.latest.read().clone()
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndicatorRecord;
    use chrono::Utc;
    use uuid::Uuid;

    fn report(symbol: &str) -> RunReport {
        let now = Utc::now();
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            records: vec![IndicatorRecord::no_data(symbol)],
            failures: Vec::new(),
        }
    }

    #[test]
    fn starts_empty() {
        let state = AppState::new(RuntimeConfig::default());
        assert!(state.latest().is_none());
        assert_eq!(state.current_state_version(), 0);
    }

    #[test]
    fn publish_replaces_latest_and_bumps_version() {
        let state = AppState::new(RuntimeConfig::default());

        assert_eq!(state.publish(Published::render(report("TCS"), "₹")), 1);
        assert_eq!(state.publish(Published::render(report("INFY"), "₹")), 2);

        let latest = state.latest().unwrap();
        assert_eq!(latest.report.records[0].symbol, "INFY");
        assert!(latest.table_html.contains("<td>INFY</td>"));
        assert!(latest.page_html.contains(&latest.table_html));
        assert_eq!(state.current_state_version(), 2);
    }
}
