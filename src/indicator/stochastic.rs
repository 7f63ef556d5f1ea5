use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::model::DailyBar;

/// Stochastic oscillator %K:
/// `100 × (close − lowest_low) / (highest_high − lowest_low)` over a
/// trailing window of highs and lows.
///
/// A flat window (highest high equals lowest low) has no defined %K; such
/// rows are `None` rather than a division by zero.
pub struct Stochastic {
    window: usize,
}

impl Stochastic {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        "stochastic"
    }

    fn min_bars(&self) -> usize {
        self.window
    }

    fn calculate(&self, bars: &[DailyBar]) -> Vec<Option<f64>> {
        if bars.len() < self.window {
            return vec![None; bars.len()];
        }

        let mut out: Vec<Option<f64>> = vec![None; self.window - 1];
        for w in bars.windows(self.window) {
            let lowest = w.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let highest = w.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let range = highest - lowest;
            if range == 0.0 {
                out.push(None);
                continue;
            }
            let close = w[self.window - 1].close;
            out.push(Some(100.0 * (close - lowest) / range));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(i: usize, low: f64, high: f64, close: f64) -> DailyBar {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailyBar {
            date: start + chrono::Days::new(i as u64),
            open: close,
            high,
            low,
            close,
            volume: 1,
        }
    }

    fn bars_from_closes(closes: &[f64]) -> Vec<DailyBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i, c, c, c))
            .collect()
    }

    #[test]
    fn stochastic_window_zero_invalid() {
        assert!(Stochastic::new(0).is_err());
    }

    #[test]
    fn stochastic_short_input_is_all_none() {
        let stoch = Stochastic::new(14).unwrap();
        let values = stoch.calculate(&bars_from_closes(&[1.0; 13]));
        assert_eq!(values, vec![None; 13]);
    }

    #[test]
    fn stochastic_flat_window_is_none() {
        let stoch = Stochastic::new(3).unwrap();
        let values = stoch.calculate(&bars_from_closes(&[100.0; 5]));
        assert_eq!(values, vec![None; 5]);
    }

    #[test]
    fn stochastic_close_at_high_is_100() {
        let stoch = Stochastic::new(3).unwrap();
        let bars = vec![
            bar(0, 1.0, 2.0, 1.5),
            bar(1, 1.5, 3.0, 2.0),
            bar(2, 2.0, 4.0, 4.0),
        ];
        let values = stoch.calculate(&bars);
        // close 4.0 == highest high over window, lowest low 1.0
        assert!((values[2].unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn stochastic_close_at_low_is_0() {
        let stoch = Stochastic::new(3).unwrap();
        let bars = vec![
            bar(0, 2.0, 4.0, 3.0),
            bar(1, 1.5, 3.0, 2.0),
            bar(2, 1.0, 2.0, 1.0),
        ];
        let values = stoch.calculate(&bars);
        assert!((values[2].unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn stochastic_midpoint_is_50() {
        let stoch = Stochastic::new(2).unwrap();
        let bars = vec![bar(0, 0.0, 10.0, 5.0), bar(1, 0.0, 10.0, 5.0)];
        let values = stoch.calculate(&bars);
        assert!((values[1].unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn stochastic_defined_values_within_range() {
        let stoch = Stochastic::new(5).unwrap();
        let bars: Vec<DailyBar> = (0..30)
            .map(|i| {
                let mid = 100.0 + ((i * 11) % 17) as f64;
                bar(i, mid - 1.0, mid + 1.0, mid + 0.5)
            })
            .collect();
        let values = stoch.calculate(&bars);
        for v in values.iter().flatten() {
            assert!((0.0..=100.0).contains(v), "%K out of range: {v}");
        }
    }
}
