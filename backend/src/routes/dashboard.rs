use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use http::header;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{DashboardInputs, DashboardQuery, DashboardView};
use crate::services::dashboard_service;
use crate::state::AppState;

const DASHBOARD_PAGE: &str = include_str!("../../static/dashboard.html");

pub fn page_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard_page))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/export", get(export_csv))
}

async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

fn log_failure(ticker: &str, err: &AppError) {
    match err {
        AppError::NoData => warn!("No data for {}", ticker),
        AppError::Validation(msg) => warn!("Rejected dashboard inputs: {}", msg),
        _ => error!("Dashboard run failed for {}: {}", ticker, err),
    }
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardView>, AppError> {
    let Query(query) = query?;
    let inputs = DashboardInputs::try_from(query)?;
    info!(
        "GET /api/dashboard - {} {}..{} (SMA {}, EMA {}, RSI {})",
        inputs.ticker, inputs.start, inputs.end, inputs.sma_window, inputs.ema_window, inputs.rsi_window
    );

    dashboard_service::build_dashboard(state.price_provider.as_ref(), &inputs)
        .await
        .map(Json)
        .map_err(|e| {
            log_failure(&inputs.ticker, &e);
            e
        })
}

pub async fn export_csv(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let inputs = DashboardInputs::try_from(query)?;
    info!("GET /api/dashboard/export - {}", inputs.ticker);

    let body = dashboard_service::export_csv(state.price_provider.as_ref(), &inputs)
        .await
        .map_err(|e| {
            log_failure(&inputs.ticker, &e);
            e
        })?;

    let disposition = format!("attachment; filename=\"{}\"", inputs.csv_filename());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
