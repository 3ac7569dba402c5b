// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators reported for every
// instrument.  Every public function returns `Option<f64>` so callers are
// forced to handle insufficient-data and numerical-edge-case scenarios.

pub mod change;
pub mod rsi;
pub mod sma;
