use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use tracing::info;

use crate::error::ProviderError;
use crate::model::{DailyBar, normalize_bars};
use crate::provider::MarketData;

const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Yahoo throttles unauthenticated chart requests aggressively; one request
/// per second is comfortably inside the limit.
const YAHOO_REQUESTS_PER_SECOND: u32 = 1;
/// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-dashboard/0.1)";

pub struct YahooProvider {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YahooProvider {
    pub fn new() -> Self {
        let quota = Quota::per_second(NonZeroU32::new(YAHOO_REQUESTS_PER_SECOND).unwrap());
        Self {
            client: reqwest::Client::new(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketData for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<DailyBar>, Report<ProviderError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            // Wait for rate limiter before making the request
            self.rate_limiter.until_ready().await;

            let url = format!("{YAHOO_BASE_URL}/v8/finance/chart/{symbol}");
            let period1 = start
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .and_utc()
                .timestamp()
                .to_string();
            let period2 = end
                .and_hms_opt(23, 59, 59)
                .unwrap_or_default()
                .and_utc()
                .timestamp()
                .to_string();
            let params = [
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
            ];

            let response = self
                .client
                .get(&url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    provider: "yahoo".into(),
                })
                .attach_with(|| format!("symbol: {symbol}"))?;

            if !response.status().is_success() {
                return Err(Report::new(ProviderError::Request {
                    provider: "yahoo".into(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let raw: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        provider: "yahoo".into(),
                    })?;

            let bars = parse_chart(raw, &symbol)?;

            info!(
                symbol = %symbol,
                start = %start,
                end = %end,
                fetched = bars.len(),
                "yahoo daily bar fetch complete"
            );

            Ok(bars)
        })
    }
}

// ── Chart API response types ─────────────────────────────────────────────────

/// `GET /v8/finance/chart/{symbol}` envelope:
/// `{ "chart": { "result": [ ... ] | null, "error": ... } }`
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

/// Parallel arrays, one entry per timestamp. Entries are `null` for days the
/// exchange reported no quote, hence `Option` throughout.
#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

fn parse_chart(raw: ChartResponse, symbol: &str) -> Result<Vec<DailyBar>, Report<ProviderError>> {
    let result = raw
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| {
            Report::new(ProviderError::NoData {
                symbol: symbol.to_owned(),
            })
        })?;

    let quote = result.indicators.quote.into_iter().next().ok_or_else(|| {
        Report::new(ProviderError::NoData {
            symbol: symbol.to_owned(),
        })
    })?;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        // Null anywhere in the row means the bar is unusable; drop it
        let row = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
            quote.volume.get(i).copied().flatten(),
        );
        if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row {
            bars.push(DailyBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }
    }

    if bars.is_empty() {
        return Err(Report::new(ProviderError::NoData {
            symbol: symbol.to_owned(),
        }));
    }

    Ok(normalize_bars(bars))
}
