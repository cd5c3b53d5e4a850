use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{dashboard, health, prices};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(dashboard::page_router())
        .nest("/health", health::router())
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/prices", prices::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
