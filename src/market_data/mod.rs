// =============================================================================
// Market Data — historical daily bars per instrument
// =============================================================================
//
// `PriceSource` is the seam between the run pipeline and whatever delivers
// price history.  The production implementation is `yahoo::YahooClient`;
// tests plug in an in-memory source.
// =============================================================================

use std::future::Future;

use thiserror::Error;

use crate::types::PriceBar;

/// Errors that can occur while fetching the history of one instrument.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout, or TLS error.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with an explicit error object.
    #[error("provider error {code}: {description}")]
    Api { code: String, description: String },

    /// Non-success status without a usable error body.
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The body could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Supplies a chronologically ordered daily series for a ticker.
///
/// An instrument with no data is an empty `Vec`, not an error.
pub trait PriceSource {
    fn fetch_history(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<Vec<PriceBar>, FetchError>> + Send;
}
