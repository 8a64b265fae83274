use anyhow::Result;
use lotto_six::{LotteryService, config};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod connection;
mod mcp_handler;
mod use_cases;

use connection::conn;
use mcp_handler::{MCPHandler, stdio};
use use_cases::{LotteryUseCase, SyncUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("🎰 Six-ball admin tools ready on stdio.");

    let db_conn = conn(&config.database_url)?;
    let service = Arc::new(LotteryService::new(db_conn, config));

    let handler = MCPHandler::new(
        Arc::new(LotteryUseCase::new(Arc::clone(&service))),
        Arc::new(SyncUseCase::new(Arc::clone(&service))),
    );

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
