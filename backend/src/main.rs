use tokio::net::TcpListener;

use stock_dashboard::app;
use stock_dashboard::config::AppConfig;
use stock_dashboard::logging::{init_logging, LoggingConfig};
use stock_dashboard::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;
    let state = AppState::new(config.build_provider()?);
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Stock dashboard running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
