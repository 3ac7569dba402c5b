// =============================================================================
// Intraday Percent Change
// =============================================================================
//
//   change % = (close - open) / open * 100

/// Percent move from `open` to `close` within one session.
///
/// Returns `None` when `open` is zero or the result is non-finite.
pub fn percent_change(open: f64, close: f64) -> Option<f64> {
    if open == 0.0 {
        return None;
    }
    let pct = (close - open) / open * 100.0;
    pct.is_finite().then_some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_up_and_down() {
        assert!((percent_change(100.0, 105.0).unwrap() - 5.0).abs() < 1e-10);
        assert!((percent_change(200.0, 190.0).unwrap() + 5.0).abs() < 1e-10);
    }

    #[test]
    fn change_flat_is_zero() {
        assert_eq!(percent_change(42.0, 42.0), Some(0.0));
    }

    #[test]
    fn change_zero_open() {
        assert!(percent_change(0.0, 1.0).is_none());
    }
}
