use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::Ema;
use crate::indicator::{Indicator, align_tail, close_prices};
use crate::model::DailyBar;

/// MACD: `EMA(close, fast) − EMA(close, slow)`, with a signal line that is
/// the EMA of the MACD line itself.
///
/// The MACD column is undefined until the slow EMA is seeded; the signal
/// line additionally waits for `signal` defined MACD values.
pub struct Macd {
    fast: usize,
    slow: usize,
    fast_ema: Ema,
    slow_ema: Ema,
    signal_ema: Ema,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, Report<IndicatorError>> {
        if fast >= slow {
            bail!(IndicatorError::InvalidParameter {
                name: "fast period must be < slow period".into(),
            });
        }
        Ok(Self {
            fast,
            slow,
            fast_ema: Ema::new(fast)?,
            slow_ema: Ema::new(slow)?,
            signal_ema: Ema::new(signal)?,
        })
    }

    /// Calculate the aligned `(macd, signal_line)` columns in one pass.
    pub fn calculate_full(&self, bars: &[DailyBar]) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let prices = close_prices(bars);
        if prices.len() < self.slow {
            return (vec![None; prices.len()], vec![None; prices.len()]);
        }

        let fast_ema = self.fast_ema.trailing(&prices);
        let slow_ema = self.slow_ema.trailing(&prices);

        // fast_ema is longer by (slow - fast) elements; align tails
        let offset = self.slow - self.fast;
        let macd_tail: Vec<f64> = fast_ema[offset..]
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_tail = self.signal_ema.trailing(&macd_tail);

        (
            align_tail(prices.len(), macd_tail),
            align_tail(prices.len(), signal_tail),
        )
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn min_bars(&self) -> usize {
        self.slow
    }

    /// Returns the MACD line column only.
    fn calculate(&self, bars: &[DailyBar]) -> Vec<Option<f64>> {
        self.calculate_full(bars).0
    }
}
