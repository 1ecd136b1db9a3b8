//! Liveness endpoint, including a round trip to the database.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::error::ApiError;
use crate::server::AppState;

/// Body returned by `GET /health`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` when the service can answer at all
    pub status: String,
    /// Database connectivity: `up`
    pub database: String,
    /// Active configuration profile
    pub profile: String,
}

/// Report service liveness. The database is probed with a trivial query;
/// when it does not answer, the service reports 503 rather than pretending
/// to be healthy.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    match db::health_check(&state.db).await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "ok".to_string(),
            database: "up".to_string(),
            profile: state.config.profile.clone(),
        })),
        Err(err) => {
            tracing::error!("database unreachable: {:#}", err);
            Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Base de données inaccessible",
            ))
        }
    }
}
