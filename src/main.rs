use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bizreview_api::config::AppConfig;
use bizreview_api::database::{models, DatabaseManager, PgRepository};
use bizreview_api::routes;
use bizreview_api::state::AppState;

#[derive(Parser)]
#[command(name = "bizreview-api")]
#[command(about = "Business review REST API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides API_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Validate configuration and resource schemas, then exit")]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting Business Review API in {:?} mode", config.environment);

    config.validate().context("invalid configuration")?;
    models::check_schemas().context("invalid resource schema")?;

    if args.check_config {
        tracing::info!("Configuration and schemas are valid");
        return Ok(());
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let repository = Arc::new(PgRepository::new(pool.clone()));
    let state = AppState::from_config(&config, repository).context("invalid configuration")?;

    let app = routes::app(state, &config.security.cors_origins);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Business Review API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
