//! # Veille API Handlers
//!
//! CRUD endpoints for compliance-tracking feed items.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, not_found};
use crate::models::veille_item::Model as VeilleModel;
use crate::repositories::{CreateVeilleRequest, VeilleRepository, VeilleUpdate};
use crate::server::AppState;

use super::DataResponse;

/// Wire representation of a veille item
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VeilleDto {
    pub id: Uuid,
    pub titre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// reglementaire, pedagogique or concurrentielle
    pub categorie: String,
    /// nouveau, lu or traite
    pub statut: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<VeilleModel> for VeilleDto {
    fn from(model: VeilleModel) -> Self {
        Self {
            id: model.id,
            titre: model.titre,
            source_url: model.source_url,
            categorie: model.categorie,
            statut: model.statut,
            commentaire: model.commentaire,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Creation payload for `POST /api/veille`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVeilleDto {
    pub titre: String,
    pub source_url: Option<String>,
    /// Defaults to reglementaire
    pub categorie: Option<String>,
    pub commentaire: Option<String>,
}

/// Partial-update payload for `PUT /api/veille/{id}`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVeilleDto {
    pub titre: Option<String>,
    pub source_url: Option<String>,
    pub categorie: Option<String>,
    pub statut: Option<String>,
    pub commentaire: Option<String>,
}

/// Statut toggle for `PUT /api/veille/{id}/statut`
#[derive(Debug, Deserialize, ToSchema)]
pub struct VeilleStatutDto {
    /// nouveau, lu or traite
    pub statut: String,
}

/// List veille items
#[utoipa::path(
    get,
    path = "/api/veille",
    responses(
        (status = 200, description = "Veille collection", body = DataResponse<Vec<VeilleDto>>)
    ),
    tag = "veille"
)]
pub async fn list_veille(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<VeilleDto>>>, ApiError> {
    let repo = VeilleRepository::new(&state.db);
    let items = repo.list().await?;
    Ok(Json(DataResponse::new(
        items.into_iter().map(VeilleDto::from).collect(),
    )))
}

/// Create a veille item
#[utoipa::path(
    post,
    path = "/api/veille",
    request_body = CreateVeilleDto,
    responses(
        (status = 201, description = "Veille item created", body = DataResponse<VeilleDto>),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "veille"
)]
pub async fn create_veille(
    State(state): State<AppState>,
    Json(request): Json<CreateVeilleDto>,
) -> Result<(StatusCode, Json<DataResponse<VeilleDto>>), ApiError> {
    let repo = VeilleRepository::new(&state.db);
    let model = repo
        .create(CreateVeilleRequest {
            titre: request.titre,
            source_url: request.source_url,
            categorie: request.categorie,
            commentaire: request.commentaire,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(VeilleDto::from(model))),
    ))
}

/// Get a veille item by ID
#[utoipa::path(
    get,
    path = "/api/veille/{id}",
    params(("id" = Uuid, Path, description = "Veille item UUID")),
    responses(
        (status = 200, description = "Veille item", body = DataResponse<VeilleDto>),
        (status = 404, description = "Veille item not found", body = ApiError)
    ),
    tag = "veille"
)]
pub async fn get_veille(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<VeilleDto>>, ApiError> {
    let repo = VeilleRepository::new(&state.db);
    let model = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Élément de veille introuvable"))?;
    Ok(Json(DataResponse::new(VeilleDto::from(model))))
}

/// Update a veille item
#[utoipa::path(
    put,
    path = "/api/veille/{id}",
    params(("id" = Uuid, Path, description = "Veille item UUID")),
    request_body = UpdateVeilleDto,
    responses(
        (status = 200, description = "Veille item updated", body = DataResponse<VeilleDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Veille item not found", body = ApiError)
    ),
    tag = "veille"
)]
pub async fn update_veille(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVeilleDto>,
) -> Result<Json<DataResponse<VeilleDto>>, ApiError> {
    let repo = VeilleRepository::new(&state.db);
    let model = repo
        .update(
            id,
            VeilleUpdate {
                titre: request.titre,
                source_url: request.source_url,
                categorie: request.categorie,
                statut: request.statut,
                commentaire: request.commentaire,
            },
        )
        .await?;
    Ok(Json(DataResponse::new(VeilleDto::from(model))))
}

/// Change the statut of a veille item
#[utoipa::path(
    put,
    path = "/api/veille/{id}/statut",
    params(("id" = Uuid, Path, description = "Veille item UUID")),
    request_body = VeilleStatutDto,
    responses(
        (status = 200, description = "Statut updated", body = DataResponse<VeilleDto>),
        (status = 400, description = "Unknown statut", body = ApiError),
        (status = 404, description = "Veille item not found", body = ApiError)
    ),
    tag = "veille"
)]
pub async fn change_veille_statut(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VeilleStatutDto>,
) -> Result<Json<DataResponse<VeilleDto>>, ApiError> {
    let repo = VeilleRepository::new(&state.db);
    let model = repo
        .update(
            id,
            VeilleUpdate {
                statut: Some(request.statut),
                ..Default::default()
            },
        )
        .await?;
    Ok(Json(DataResponse::new(VeilleDto::from(model))))
}

/// Delete a veille item
#[utoipa::path(
    delete,
    path = "/api/veille/{id}",
    params(("id" = Uuid, Path, description = "Veille item UUID")),
    responses(
        (status = 204, description = "Veille item deleted"),
        (status = 404, description = "Veille item not found", body = ApiError)
    ),
    tag = "veille"
)]
pub async fn delete_veille(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = VeilleRepository::new(&state.db);
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
