// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use ingest::{ListingStore, PostgresStore};
use server_core::domains::auth::JwtService;
use server_core::kernel::{build_import_service, start_scheduler};
use server_core::server::{build_app, AppState};
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,ingest=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting job import API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let store: Arc<dyn ListingStore> = Arc::new(PostgresStore::new(pool));
    let imports = Arc::new(build_import_service(&config, store)?);

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match &config.import_schedule {
        Some(schedule) => Some(
            start_scheduler(imports.clone(), schedule)
                .await
                .context("Failed to start import scheduler")?,
        ),
        None => {
            tracing::info!("IMPORT_SCHEDULE not set, imports run only when triggered");
            None
        }
    };

    let app = build_app(AppState {
        imports,
        jwt_service: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        cron_secret: Arc::from(config.cron_secret.as_str()),
    });

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Import trigger: POST http://localhost:{}/api/import/jobs", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
