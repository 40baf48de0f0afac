//! Ziklo API Server
//!
//! Main entry point for the Ziklo time-tracking backend.

use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ziklo_api::{AppState, create_router};
use ziklo_core::storage::{StorageConfig, StorageProvider, StorageService};
use ziklo_core::timesheet::TimesheetRules;
use ziklo_db::{connect_with, migrate};
use ziklo_shared::{AppConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let json = config.logging.format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ziklo=debug,tower_http=debug".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    if config.database.run_migrations {
        migrate(&db).await?;
        info!("Migrations applied");
    }

    let storage =
        StorageService::from_config(StorageConfig::new(StorageProvider::from(&config.storage)))?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Artifact storage configured"
    );

    let rules = TimesheetRules::from_config(&config.business)?;
    info!(
        timezone = %rules.timezone(),
        max_hours_per_day = %rules.max_hours_per_day(),
        "Timesheet rules loaded"
    );

    let state = AppState::new(db, storage, rules)
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
