use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::{Indicator, align_tail, close_prices};
use crate::model::DailyBar;

/// Exponential Moving Average with smoothing factor `2 / (period + 1)`,
/// seeded with the SMA of the first `period` values.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    /// Trailing EMA values over a price slice. The first output corresponds
    /// to input index `period - 1`; empty when the slice is too short.
    pub fn trailing(&self, prices: &[f64]) -> Vec<f64> {
        if prices.len() < self.period {
            return Vec::new();
        }

        let k = 2.0 / (self.period as f64 + 1.0);
        let seed: f64 = prices[..self.period].iter().sum::<f64>() / self.period as f64;
        let mut ema = seed;
        let mut results = vec![ema];

        for &price in &prices[self.period..] {
            ema = price * k + ema * (1.0 - k);
            results.push(ema);
        }

        results
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn min_bars(&self) -> usize {
        self.period
    }

    fn calculate(&self, bars: &[DailyBar]) -> Vec<Option<f64>> {
        align_tail(bars.len(), self.trailing(&close_prices(bars)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars_from_closes(closes: &[f64]) -> Vec<DailyBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| DailyBar {
                date: start + chrono::Days::new(i as u64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1,
            })
            .collect()
    }

    #[test]
    fn ema_period_zero_invalid() {
        assert!(Ema::new(0).is_err());
    }

    #[test]
    fn ema_short_input_is_all_none() {
        let ema = Ema::new(5).unwrap();
        let values = ema.calculate(&bars_from_closes(&[1.0; 4]));
        assert_eq!(values, vec![None; 4]);
    }

    #[test]
    fn ema_flat_prices_stay_flat() {
        let ema = Ema::new(3).unwrap();
        let values = ema.calculate(&bars_from_closes(&[10.0; 6]));
        for v in values.iter().flatten() {
            assert!((v - 10.0).abs() < 1e-9);
        }
        assert_eq!(values.iter().flatten().count(), 4);
    }

    #[test]
    fn ema_seed_equals_sma_of_first_period() {
        let ema = Ema::new(3).unwrap();
        let values = ema.calculate(&bars_from_closes(&[1.0, 2.0, 3.0, 4.0]));
        // seed at index 2 = (1+2+3)/3 = 2.0
        assert!((values[2].unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn ema_recent_prices_weighted_more() {
        let ema = Ema::new(3).unwrap();
        let rising = ema.trailing(&[1.0, 2.0, 3.0, 10.0]);
        // k = 0.5: 10*0.5 + 2*0.5 = 6.0
        assert!((rising[1] - 6.0).abs() < 1e-9);
    }
}
