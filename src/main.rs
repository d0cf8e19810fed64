use std::sync::Arc;

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use portfolio_api::{
    codec::ArrayCodec,
    constants::START_TIME,
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    repositories::memory::{InMemoryBlogPostRepo, InMemoryProjectRepo},
    routes::configure_routes,
    settings::{AppConfig, StorageBackend},
    shared_repos::SharedRepositories,
    telemetry::init_tracing,
    web::cors,
    AppState,
};
use tracing_actix_web::TracingLogger;

async fn build_repositories(config: &AppConfig) -> anyhow::Result<SharedRepositories> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.max_db_connections)
                .await
                .context("Failed to create database connection pool")?;

            if config.run_migrations {
                run_migrations(&pool).await.context("Failed to run database migrations")?;
            }

            Ok(SharedRepositories::postgres(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(SharedRepositories::in_memory(
                Arc::new(InMemoryProjectRepo::new()),
                Arc::new(InMemoryBlogPostRepo::new()),
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);
    once_cell::sync::Lazy::force(&START_TIME);
    tracing::info!("Loaded configuration: {:?}", config);

    let repos = build_repositories(&config).await.inspect_err(|e| {
        tracing::error!("Storage initialisation failed: {:#}", e);
    })?;

    let app_state = web::Data::new(AppState::new(
        repos,
        ArrayCodec::new(config.array_decode_policy),
    ));
    let admin_gate = web::Data::new(config.admin_gate());

    let server_addr = config.server_addr();
    tracing::info!(
        "🚀 Starting {} v{} on {} ({} workers)",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.worker_count
    );

    let cors_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(admin_gate.clone())
            .wrap(cors(&cors_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .disable_signals()
    .run();

    let handle = server.handle();

    tokio::select! {
        res = server => res.context("HTTP server error")?,
        reason = shutdown_signal() => {
            tracing::info!("Stopping HTTP server after {}", reason);
            handle.stop(true).await;
        }
    }

    Ok(())
}
