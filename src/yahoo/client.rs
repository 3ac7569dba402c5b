// =============================================================================
// Yahoo Finance Chart API Client — daily history per ticker
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?range=6mo&interval=1d
//
// The chart endpoint returns parallel arrays (timestamps, opens, closes, ...).
// Sessions where the provider has no open or close (`null`) are dropped, the
// rest become `PriceBar`s in the order delivered.  When `adjclose` is present
// prices are dividend/split adjusted: close := adjclose, open scaled alike.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::market_data::{FetchError, PriceSource};
use crate::types::PriceBar;

/// The chart API rejects requests without a browser-like agent.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance REST client for daily OHLC history.
#[derive(Clone)]
pub struct YahooClient {
    base_url: Url,
    range: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a new `YahooClient`.
    ///
    /// # Arguments
    /// * `base_url` — e.g. `https://query1.finance.yahoo.com`
    /// * `range`    — history window understood by the API, e.g. `6mo`
    pub fn new(base_url: &str, range: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid data source base URL {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("data source base URL {base_url} cannot carry a path");
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self {
            base_url,
            range: range.into(),
            client,
        })
    }

    /// Full chart URL for `symbol`, path-encoded.
    fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always there.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url.query_pairs_mut()
            .append_pair("range", &self.range)
            .append_pair("interval", "1d");
        url
    }

    #[instrument(skip(self), name = "yahoo::fetch_history")]
    async fn get_chart(&self, symbol: &str) -> Result<Vec<PriceBar>, FetchError> {
        let url = self.chart_url(symbol);

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let bars = match parse_chart(&body) {
            Ok(bars) => bars,
            // Error statuses usually carry a JSON error object; fall back to
            // the bare status when they do not.
            Err(FetchError::Decode(_)) if !status.is_success() => {
                return Err(FetchError::Status(status));
            }
            Err(e) => return Err(e),
        };

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        if bars.is_empty() {
            warn!(symbol, "chart response contained no usable bars");
        } else {
            debug!(
                symbol,
                bars = bars.len(),
                last_session = bars.last().map(|b| b.timestamp),
                "history retrieved"
            );
        }
        Ok(bars)
    }
}

impl PriceSource for YahooClient {
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<PriceBar>, FetchError> {
        self.get_chart(symbol).await
    }
}

// =============================================================================
// Response parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Apply the dividend/split adjustment: close becomes the adjusted close and
/// open is scaled by the same factor.  Raw prices pass through when there is
/// no usable adjusted close.
fn adjust(open: f64, close: f64, adjclose: Option<f64>) -> (f64, f64) {
    match adjclose {
        Some(adj) if close != 0.0 && adj.is_finite() => (open * adj / close, adj),
        _ => (open, close),
    }
}

/// Decode a chart API body into bars, using adjusted prices when the
/// response carries them.
///
/// A body without results and without an error object is an empty series.
fn parse_chart(body: &str) -> Result<Vec<PriceBar>, FetchError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(FetchError::Api {
            code: err.code,
            description: err.description,
        });
    }

    let Some(result) = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Ok(Vec::new());
    };

    let mut indicators = result.indicators;
    let Some(quote) = indicators.quote.drain(..).next() else {
        return Ok(Vec::new());
    };
    let adjusted = indicators
        .adjclose
        .drain(..)
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &timestamp)| {
            let open = (*quote.open.get(i)?)?;
            let close = (*quote.close.get(i)?)?;
            let (open, close) = adjust(open, close, adjusted.get(i).copied().flatten());
            Some(PriceBar {
                timestamp,
                open,
                close,
            })
        })
        .collect();

    Ok(bars)
}
