use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar for an equity.
///
/// Bar sequences handed to the indicator pipeline must be sorted ascending by
/// `date` with no duplicate dates. Calendar gaps (weekends, holidays) are
/// expected and are not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Discrete trading signal derived from RSI thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// A `DailyBar` annotated with the derived indicator columns.
///
/// `None` means the value is undefined at this row (insufficient lookback, or
/// a flat high/low window for the stochastic). Undefined is a first-class
/// state, never a sentinel float.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: DailyBar,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
    pub stochastic: Option<f64>,
    /// `None` when RSI is undefined: an unknown state, distinct from `Hold`.
    pub signal: Option<Signal>,
}

/// Signal counts over the whole window. Feeds the gauge and the two scalar
/// metrics on the dashboard; rows with an undefined signal are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalSummary {
    pub buy_days: usize,
    pub sell_days: usize,
    pub hold_days: usize,
}

impl SignalSummary {
    pub fn from_rows(rows: &[IndicatorRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match row.signal {
                Some(Signal::Buy) => summary.buy_days += 1,
                Some(Signal::Sell) => summary.sell_days += 1,
                Some(Signal::Hold) => summary.hold_days += 1,
                None => {}
            }
        }
        summary
    }
}

/// Sort bars ascending by date and drop duplicate dates (keeping the last
/// occurrence), so downstream code can rely on the sequence invariant
/// regardless of provider behavior.
pub fn normalize_bars(mut bars: Vec<DailyBar>) -> Vec<DailyBar> {
    bars.sort_by_key(|b| b.date);
    bars.reverse();
    bars.dedup_by_key(|b| b.date);
    bars.reverse();
    bars
}
