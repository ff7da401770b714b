use anyhow::Result;
use dotenv::dotenv;
use ltp_service::config::Config;
use ltp_service::handlers::{router, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv().ok();

    let config = Config::from_env()?;
    info!(
        "Kraken trades endpoint: {} (max retries {}, retry wait {:?})",
        config.kraken_trades_url, config.http.max_retries, config.http.retry_wait
    );

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let addr = config.listen_addr();
    info!("Starting last trade price service on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
