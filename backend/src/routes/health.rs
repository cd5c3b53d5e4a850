use axum::{
    extract::State,
    Router,
    routing::get,
};
use tracing::info;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
}

async fn health(State(state): State<AppState>) -> &'static str {
    info!("GET /health - Health check (provider: {})", state.price_provider.name());
    "OK"
}
