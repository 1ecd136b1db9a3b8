//! # Formapilot API Main Entry Point

use formapilot::{
    config::ConfigLoader, db::init_pool, seeds::seed_programme_catalog, server::run_server,
    telemetry,
};
use migration::MigratorTrait;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    telemetry::init_tracing(&config)?;

    tracing::info!(profile = %config.profile, "loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!("configuration: {}", redacted_json);
    }

    let db = init_pool(&config).await?;
    migration::Migrator::up(&db, None).await?;

    if let Err(err) = seed_programme_catalog(&db).await {
        tracing::warn!("programme catalog seeding failed: {:#}", err);
    }

    run_server(config, db).await
}
