//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Formapilot API.

use crate::models::ServiceInfo;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod health;
pub mod programmes;
pub mod rendezvous;
pub mod users;
pub mod veille;

/// Standard response wrapper: every successful payload travels under `data`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DataResponse<T> {
    /// Response data
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}
