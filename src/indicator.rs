pub mod ma;
pub mod macd;
pub mod rsi;
pub mod stochastic;

use crate::model::DailyBar;

/// A technical analysis indicator that operates on a slice of daily bars.
///
/// Bars must be in ascending chronological order (oldest first).
pub trait Indicator: Send {
    /// Unique name of this indicator (e.g., "rsi", "macd").
    #[allow(dead_code)]
    fn name(&self) -> &str;

    /// Minimum number of bars required to produce at least one defined value.
    fn min_bars(&self) -> usize;

    /// Calculate indicator values, one per input bar, aligned with the input.
    ///
    /// Warm-up rows (and rows the indicator cannot define, such as a flat
    /// high/low window for the stochastic) are `None`. An input shorter than
    /// the warm-up yields all-`None`: a degenerate but valid output, not an
    /// error.
    fn calculate(&self, bars: &[DailyBar]) -> Vec<Option<f64>>;
}

/// Extract close prices from a slice of bars.
pub fn close_prices(bars: &[DailyBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Left-pad a tail of trailing values with `None` so the result aligns
/// one-to-one with an input of length `len`.
pub fn align_tail(len: usize, tail: Vec<f64>) -> Vec<Option<f64>> {
    let pad = len.saturating_sub(tail.len());
    let mut out: Vec<Option<f64>> = vec![None; pad];
    out.extend(tail.into_iter().map(Some));
    out.truncate(len);
    out
}
