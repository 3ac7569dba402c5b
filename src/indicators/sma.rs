// =============================================================================
// Simple Moving Average (SMA) — trailing window
// =============================================================================
//
// SMA(w) is the arithmetic mean of the last `w` closes.  The window always
// ends at the most recent close; there is no centred or leading variant.
// =============================================================================

/// Mean of the last `period` closes.
///
/// # Edge cases
/// - `period == 0` => `None`
/// - `closes.len() < period` => `None`
/// - Non-finite mean => `None`
pub fn trailing_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;

    mean.is_finite().then_some(mean)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(trailing_sma(&[], 5).is_none());
    }

    #[test]
    fn sma_period_zero() {
        assert!(trailing_sma(&[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn sma_one_short_of_window() {
        let closes: Vec<f64> = (1..=49).map(|x| x as f64).collect();
        assert!(trailing_sma(&closes, 50).is_none());
    }

    #[test]
    fn sma_exact_window_is_plain_mean() {
        let closes: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let sma = trailing_sma(&closes, 50).unwrap();
        assert!((sma - 25.5).abs() < 1e-10, "got {sma}");
    }

    #[test]
    fn sma_uses_trailing_window() {
        // Last three of 1..=10 are 8, 9, 10.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let sma = trailing_sma(&closes, 3).unwrap();
        assert!((sma - 9.0).abs() < 1e-10, "got {sma}");
    }

    #[test]
    fn sma_nan_input_is_none() {
        assert!(trailing_sma(&[1.0, f64::NAN, 3.0], 3).is_none());
    }
}
