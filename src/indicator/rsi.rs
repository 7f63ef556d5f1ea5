use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, align_tail, close_prices};
use crate::model::DailyBar;

/// RSI (Relative Strength Index) using Wilder's smoothing method.
///
/// The first `window` rows are undefined; the first defined value sits at
/// input index `window`.
pub struct Rsi {
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn min_bars(&self) -> usize {
        self.window + 1
    }

    fn calculate(&self, bars: &[DailyBar]) -> Vec<Option<f64>> {
        let prices = close_prices(bars);
        if prices.len() < self.min_bars() {
            return vec![None; prices.len()];
        }

        let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

        // Seed using simple average of first `window` gains/losses
        let mut avg_gain: f64 = deltas[..self.window]
            .iter()
            .map(|&d| d.max(0.0))
            .sum::<f64>()
            / self.window as f64;
        let mut avg_loss: f64 = deltas[..self.window]
            .iter()
            .map(|&d| (-d).max(0.0))
            .sum::<f64>()
            / self.window as f64;

        let mut tail = vec![rsi_value(avg_gain, avg_loss)];

        // Wilder smoothing for subsequent values
        for &delta in &deltas[self.window..] {
            let gain = delta.max(0.0);
            let loss = (-delta).max(0.0);
            avg_gain = (avg_gain * (self.window - 1) as f64 + gain) / self.window as f64;
            avg_loss = (avg_loss * (self.window - 1) as f64 + loss) / self.window as f64;
            tail.push(rsi_value(avg_gain, avg_loss));
        }

        align_tail(prices.len(), tail)
    }
}

/// RSI from smoothed averages; in [0, 100] whenever the averages are
/// non-negative, which Wilder smoothing of non-negative terms guarantees.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
