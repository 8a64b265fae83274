use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use lotto_six::database::open_database;
use lotto_six::{AppState, LotteryService, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Opening {}", config.database_url);
    let conn = open_database(&config.database_url)?;

    let bind_addr = config.bind_addr.clone();
    let service = LotteryService::new(Arc::new(Mutex::new(conn)), config);
    let app = router(AppState {
        service: Arc::new(service),
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("🎰 Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
