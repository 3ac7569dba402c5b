// =============================================================================
// Relative Strength Index (RSI) — Rolling-Mean Variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.  The gain
//          and loss series are aligned with the closes: the first close has
//          no predecessor and contributes 0 gain and 0 loss.
// Step 2 — avg_gain / avg_loss = simple mean of the last `period` entries of
//          the gain / loss series (no exponential smoothing).
// Step 3 — RS  = avg_gain / avg_loss       (x / 0 = +inf, 0 / 0 = NaN)
//          RSI = 100 - 100 / (1 + RS)
//
// Reporting policy: a value is only produced when RS > 0.  A window with no
// gains (RS == 0, which would be RSI 0) or no movement at all (RS NaN) is
// reported as unavailable.  A window with no losses (RS = +inf) is RSI 100.
// =============================================================================

/// Compute the latest RSI for `closes` over `period`.
///
/// # Edge cases
/// - `period == 0` => `None`
/// - `closes.len() < period` => `None`
/// - `RS` not strictly positive (zero or NaN) => `None`
pub fn rolling_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    // Window over the aligned gain/loss series; index 0 is the padded entry.
    let start = (closes.len() - period).max(1);
    let (sum_gain, sum_loss) = (start..closes.len()).fold((0.0_f64, 0.0_f64), |(g, l), i| {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            (g + delta, l)
        } else if delta < 0.0 {
            (g, l - delta)
        } else {
            (g, l)
        }
    });

    let period_f = period as f64;
    let avg_gain = sum_gain / period_f;
    let avg_loss = sum_loss / period_f;

    rsi_from_averages(avg_gain, avg_loss)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` whenever `RS > 0` does not hold, including the NaN produced
/// by a window without any movement.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rs = avg_gain / avg_loss;
    if rs.is_nan() || rs <= 0.0 {
        return None;
    }

    let rsi = 100.0 - 100.0 / (1.0 + rs);
    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}
