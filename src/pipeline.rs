use error_stack::Report;

use crate::config::{IndicatorSettings, SignalSettings};
use crate::error::IndicatorError;
use crate::indicator::Indicator;
use crate::indicator::macd::Macd;
use crate::indicator::rsi::Rsi;
use crate::indicator::stochastic::Stochastic;
use crate::model::{DailyBar, IndicatorRow, Signal};

/// Annotates a bar series with RSI, MACD (+ signal line), stochastic %K and
/// the RSI-threshold trading signal.
///
/// `compute` is a pure function of its input: same length and order as the
/// bars, no hidden state, identical output on repeated calls.
pub struct IndicatorPipeline {
    rsi: Rsi,
    macd: Macd,
    stochastic: Stochastic,
    thresholds: SignalSettings,
}

impl IndicatorPipeline {
    pub fn new(
        indicators: &IndicatorSettings,
        thresholds: SignalSettings,
    ) -> Result<Self, Report<IndicatorError>> {
        Ok(Self {
            rsi: Rsi::new(indicators.rsi_window)?,
            macd: Macd::new(
                indicators.macd_fast,
                indicators.macd_slow,
                indicators.macd_signal,
            )?,
            stochastic: Stochastic::new(indicators.stochastic_window)?,
            thresholds,
        })
    }

    pub fn compute(&self, bars: &[DailyBar]) -> Vec<IndicatorRow> {
        let rsi = self.rsi.calculate(bars);
        let (macd, signal_line) = self.macd.calculate_full(bars);
        let stochastic = self.stochastic.calculate(bars);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                bar: bar.clone(),
                rsi: rsi[i],
                macd: macd[i],
                signal_line: signal_line[i],
                stochastic: stochastic[i],
                signal: rsi[i].map(|r| classify(r, &self.thresholds)),
            })
            .collect()
    }
}

/// Threshold classification of a defined RSI value.
///
/// Both boundaries are exclusive: an RSI exactly at a threshold is `Hold`.
pub fn classify(rsi: f64, thresholds: &SignalSettings) -> Signal {
    if rsi > thresholds.overbought_threshold {
        Signal::Sell
    } else if rsi < thresholds.oversold_threshold {
        Signal::Buy
    } else {
        Signal::Hold
    }
}
