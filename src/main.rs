use actix::Actor;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod config;
mod domain;
mod metrics;
mod storage;
mod webhook;

use actors::AccumulatorActor;
use config::AppConfig;
use metrics::Metrics;
use storage::{PgStorageGateway, StorageGateway};
use webhook::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_webhook=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, "Starting order webhook backend");

    tracing::info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    let gateway = PgStorageGateway::new(pool, config.storage_timeout);
    gateway.ensure_schema().await?;
    tracing::info!("Database schema ready");

    let metrics = Arc::new(Metrics::new()?);
    let accumulator = AccumulatorActor::new(metrics.clone()).start();
    let storage: Arc<dyn StorageGateway> = Arc::new(gateway);

    let state = web::Data::new(AppState {
        accumulator,
        storage,
        metrics,
    });

    tracing::info!(bind_addr = %config.bind_addr, "Webhook server listening");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/", web::post().to(webhook::handle))
            .route("/health", web::get().to(webhook::health))
            .route("/metrics", web::get().to(webhook::metrics))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
