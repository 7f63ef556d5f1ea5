use crate::model::{IndicatorRow, SignalSummary};
use crate::render::Renderer;

/// Logs the latest indicator readout and the window-wide signal counts.
pub struct TerminalRenderer;

impl Renderer for TerminalRenderer {
    fn render(&self, ticker: &str, rows: &[IndicatorRow], summary: &SignalSummary) {
        let Some(latest) = rows.last() else {
            tracing::warn!(ticker, "no rows to render");
            return;
        };

        tracing::info!(
            ticker,
            date = %latest.bar.date,
            close = latest.bar.close,
            rsi = latest.rsi,
            macd = latest.macd,
            signal_line = latest.signal_line,
            stochastic = latest.stochastic,
            signal = latest.signal.map(|s| s.to_string()),
            "latest indicator readout"
        );

        tracing::info!(
            ticker,
            days = rows.len(),
            buy_days = summary.buy_days,
            sell_days = summary.sell_days,
            hold_days = summary.hold_days,
            "signal summary over window"
        );
    }
}
