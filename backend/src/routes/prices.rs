use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Json, Router};
use axum::routing::get;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{DashboardInputs, DashboardQuery, PriceSeries};
use crate::services::market_data_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:ticker", get(get_prices))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
}

/// Raw normalized OHLCV bars, without indicators.
pub async fn get_prices(
    Path(ticker): Path<String>,
    State(state): State<AppState>,
    range: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<PriceSeries>, AppError> {
    let Query(range) = range?;
    info!("GET /api/prices/{} - Getting price history", ticker);

    // Same parsing and defaults as the dashboard form.
    let inputs = DashboardInputs::try_from(DashboardQuery {
        ticker: Some(ticker),
        start: range.start,
        end: range.end,
        ..Default::default()
    })?;

    let series = market_data_service::fetch_series(
        state.price_provider.as_ref(),
        &inputs.ticker,
        inputs.start,
        inputs.end,
    )
    .await?;

    Ok(Json(series))
}
