use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Json},
    routing::get,
};
use error_stack::{Report, ResultExt};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::ServerError;
use crate::model::{IndicatorRow, SignalSummary};

const INDEX_HTML: &str = include_str!("../assets/dashboard.html");

/// Immutable snapshot served by the dashboard. Built once after the pipeline
/// runs; the server never mutates it.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub ticker: String,
    pub rows: Vec<IndicatorRow>,
    pub summary: SignalSummary,
}

/// Build the dashboard router: the embedded chart page and its JSON feed.
pub fn router(snapshot: Arc<DashboardSnapshot>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/dashboard", get(dashboard))
        .layer(cors)
        .with_state(snapshot)
}

/// Serve the dashboard on `addr` until ctrl-c.
pub async fn serve(addr: &str, snapshot: Arc<DashboardSnapshot>) -> Result<(), Report<ServerError>> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .change_context(ServerError::Bind { addr: addr.into() })?;

    info!(addr, "dashboard available");

    axum::serve(listener, router(snapshot))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .change_context(ServerError::Serve)?;

    info!("dashboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("ctrl+c received, shutting down");
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn dashboard(State(snapshot): State<Arc<DashboardSnapshot>>) -> impl IntoResponse {
    Json(serde_json::to_value(snapshot.as_ref()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DailyBar, Signal};
    use chrono::NaiveDate;

    fn snapshot() -> Arc<DashboardSnapshot> {
        let bar = DailyBar {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            open: 190.0,
            high: 194.0,
            low: 189.0,
            close: 193.2,
            volume: 48_000_000,
        };
        Arc::new(DashboardSnapshot {
            ticker: "AAPL".into(),
            rows: vec![IndicatorRow {
                bar,
                rsi: Some(72.4),
                macd: Some(1.3),
                signal_line: Some(0.9),
                stochastic: None,
                signal: Some(Signal::Sell),
            }],
            summary: SignalSummary {
                buy_days: 3,
                sell_days: 12,
                hold_days: 180,
            },
        })
    }

    #[test]
    fn snapshot_serializes_with_flattened_bar_and_nulls() {
        let json = serde_json::to_value(snapshot().as_ref()).unwrap();
        let row = &json["rows"][0];
        assert_eq!(row["close"], 193.2);
        assert_eq!(row["rsi"], 72.4);
        assert!(row["stochastic"].is_null());
        assert_eq!(row["signal"], "Sell");
        assert_eq!(json["summary"]["sell_days"], 12);
    }

    #[test]
    fn router_builds() {
        let _ = router(snapshot());
    }

    #[test]
    fn index_page_embeds_chart_sections() {
        assert!(INDEX_HTML.contains("/api/dashboard"));
        assert!(INDEX_HTML.contains("plotly"));
    }
}
