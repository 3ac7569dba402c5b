// =============================================================================
// Shared types used across the Optimist Trader service
// =============================================================================

use serde::{Deserialize, Serialize};

/// One trading day's observation for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Session timestamp in UNIX seconds, as delivered by the data source.
    pub timestamp: i64,
    pub open: f64,
    pub close: f64,
}

/// Why a metric could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unavailability {
    /// The instrument returned no bars (or fetching / computing failed).
    NoData,
    /// The series is too short for the metric window, or the RSI policy
    /// rejected the latest relative strength.
    InsufficientHistory,
}

impl Unavailability {
    /// Literal sentinel rendered in place of a number.
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::NoData => "Data Not Available",
            Self::InsufficientHistory => "Insufficient Data",
        }
    }
}

/// A derived numeric metric, or the reason it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Metric {
    Value(f64),
    Unavailable(Unavailability),
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<Option<f64>> for Metric {
    /// `None` maps to `InsufficientHistory`, which is what every windowed
    /// indicator means when it has nothing to report.
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::Unavailable(Unavailability::InsufficientHistory),
        }
    }
}

/// Golden-crossover trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Unavailable,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Unavailable => write!(f, "{}", Unavailability::NoData.sentinel()),
        }
    }
}

/// Per-instrument output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// Display symbol with the exchange suffix stripped.
    pub symbol: String,
    pub price: Metric,
    pub change_pct: Metric,
    pub rsi: Metric,
    pub sma_50: Metric,
    pub sma_100: Metric,
    pub sma_200: Metric,
    pub signal: Signal,
}

impl IndicatorRecord {
    /// Record with every field marked as having no data.
    pub fn no_data(symbol: impl Into<String>) -> Self {
        let na = Metric::Unavailable(Unavailability::NoData);
        Self {
            symbol: symbol.into(),
            price: na,
            change_pct: na,
            rsi: na,
            sma_50: na,
            sma_100: na,
            sma_200: na,
            signal: Signal::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_record_marks_every_field() {
        let rec = IndicatorRecord::no_data("TCS");
        assert_eq!(rec.symbol, "TCS");
        for m in [rec.price, rec.change_pct, rec.rsi, rec.sma_50, rec.sma_100, rec.sma_200] {
            assert_eq!(m, Metric::Unavailable(Unavailability::NoData));
        }
        assert_eq!(rec.signal, Signal::Unavailable);
    }

    #[test]
    fn signal_display_uses_sentinel() {
        assert_eq!(Signal::Buy.to_string(), "Buy");
        assert_eq!(Signal::Sell.to_string(), "Sell");
        assert_eq!(Signal::Unavailable.to_string(), "Data Not Available");
    }

    #[test]
    fn metric_from_option() {
        assert_eq!(Metric::from(Some(1.5)), Metric::Value(1.5));
        assert_eq!(
            Metric::from(None),
            Metric::Unavailable(Unavailability::InsufficientHistory)
        );
    }

    #[test]
    fn metric_serialises_tagged() {
        let json = serde_json::to_value(Metric::Value(2.0)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "Value", "value": 2.0 }));
        let json = serde_json::to_value(Metric::Unavailable(Unavailability::NoData)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "Unavailable", "value": "NoData" }));
    }
}
