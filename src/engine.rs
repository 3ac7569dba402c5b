// =============================================================================
// Indicator Engine — PriceSeries -> IndicatorRecord
// =============================================================================
//
// Pure per-instrument computation.  Given the chronologically ordered daily
// bars of one instrument, derive:
//
//   - latest close and intraday percent change of the last bar
//   - SMA(50), SMA(100), SMA(200) over trailing windows
//   - RSI(14), rolling-mean variant
//   - Golden-crossover signal from SMA(50) vs SMA(100)
//
// An empty series yields a record with every field unavailable.  Bars with a
// non-finite or non-positive price are rejected with `AnalysisError` so the
// caller can isolate the instrument.
// =============================================================================

use thiserror::Error;

use crate::indicators::{change::percent_change, rsi::rolling_rsi, sma::trailing_sma};
use crate::types::{IndicatorRecord, Metric, PriceBar, Signal};

pub const RSI_PERIOD: usize = 14;
pub const SMA_FAST: usize = 50;
pub const SMA_SLOW: usize = 100;
pub const SMA_LONG: usize = 200;

/// Errors raised while computing indicators for a single instrument.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("bar {index} has a malformed price (open={open}, close={close})")]
    MalformedBar { index: usize, open: f64, close: f64 },
}

/// Compute the full indicator record for one instrument.
pub fn analyze(symbol: &str, bars: &[PriceBar]) -> Result<IndicatorRecord, AnalysisError> {
    let Some(last) = bars.last() else {
        return Ok(IndicatorRecord::no_data(symbol));
    };

    validate(bars)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let sma_50 = Metric::from(trailing_sma(&closes, SMA_FAST));
    let sma_100 = Metric::from(trailing_sma(&closes, SMA_SLOW));
    let sma_200 = Metric::from(trailing_sma(&closes, SMA_LONG));

    Ok(IndicatorRecord {
        symbol: symbol.to_string(),
        price: Metric::Value(last.close),
        change_pct: Metric::from(percent_change(last.open, last.close)),
        rsi: Metric::from(rolling_rsi(&closes, RSI_PERIOD)),
        sma_50,
        sma_100,
        sma_200,
        signal: crossover_signal(sma_50, sma_100),
    })
}

/// Buy when the fast SMA is above the slow one, Sell when below.  Ties and
/// missing averages yield no signal.
pub fn crossover_signal(fast: Metric, slow: Metric) -> Signal {
    match (fast.value(), slow.value()) {
        (Some(f), Some(s)) if f > s => Signal::Buy,
        (Some(f), Some(s)) if f < s => Signal::Sell,
        _ => Signal::Unavailable,
    }
}

/// Strip the exchange `suffix` from a ticker for display.
pub fn display_symbol<'a>(ticker: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return ticker;
    }
    ticker.strip_suffix(suffix).unwrap_or(ticker)
}

fn validate(bars: &[PriceBar]) -> Result<(), AnalysisError> {
    let valid = |p: f64| p.is_finite() && p > 0.0;
    match bars
        .iter()
        .position(|b| !valid(b.open) || !valid(b.close))
    {
        Some(index) => Err(AnalysisError::MalformedBar {
            index,
            open: bars[index].open,
            close: bars[index].close,
        }),
        None => Ok(()),
    }
}
