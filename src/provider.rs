pub mod yahoo;

use chrono::NaiveDate;
use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ProviderError;
use crate::model::DailyBar;

/// Abstraction over a daily market-data provider.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketData`).
pub trait MarketData: Send + Sync {
    /// Human-readable provider name for logs and error reports.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV bars for `symbol` over `[start, end]`, ascending
    /// by date.
    ///
    /// An empty result is reported as `ProviderError::NoData` so callers see
    /// a distinct "data unavailable" condition instead of a silent empty
    /// series.
    fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<DailyBar>, Report<ProviderError>>>;
}
