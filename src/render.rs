pub mod terminal;

use crate::model::{IndicatorRow, SignalSummary};

/// Renders a computed dashboard snapshot to some output surface.
pub trait Renderer: Send + Sync {
    fn render(&self, ticker: &str, rows: &[IndicatorRow], summary: &SignalSummary);
}
