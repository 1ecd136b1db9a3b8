//! Test utilities for database and app testing.
//!
//! Provides an in-memory SQLite database with migrations applied, plus
//! fixture helpers for rendez-vous records.

use anyhow::Result;
use axum::Router;
use formapilot::config::AppConfig;
use formapilot::models::rendezvous::Model as RendezvousModel;
use formapilot::repositories::{CreateRendezvousRequest, RendezvousRepository};
use formapilot::server::{AppState, create_app};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Builds the full application router over the given database with default
/// configuration.
#[allow(dead_code)]
pub fn build_test_app(db: DatabaseConnection) -> Router {
    let config = AppConfig {
        profile: "test".to_string(),
        ..Default::default()
    };
    create_app(AppState { db, config })
}

/// Creates a positionnement rendezvous fixture.
#[allow(dead_code)]
pub async fn create_positionnement(db: &DatabaseConnection) -> Result<RendezvousModel> {
    let repo = RendezvousRepository::new(db);
    let model = repo
        .create(CreateRendezvousRequest {
            type_rdv: "positionnement".to_string(),
            nom_beneficiaire: Some("Durand".to_string()),
            prenom_beneficiaire: Some("Claire".to_string()),
            email_beneficiaire: Some("claire.durand@example.fr".to_string()),
            telephone_beneficiaire: Some("0612345678".to_string()),
            formation_selectionnee: Some("Bureautique - initiation".to_string()),
            ..Default::default()
        })
        .await?;
    Ok(model)
}
