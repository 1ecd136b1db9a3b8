//! # Programmes API Handlers
//!
//! CRUD endpoints for the training-program catalog.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, not_found};
use crate::models::programme::Model as ProgrammeModel;
use crate::repositories::{CreateProgrammeRequest, ProgrammeRepository, ProgrammeUpdate};
use crate::server::AppState;

use super::DataResponse;

/// Wire representation of a programme
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammeDto {
    pub id: Uuid,
    /// Catalog code, unique
    pub code: String,
    pub titre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duree_heures: Option<i32>,
    /// Price in cents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prix_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectifs_pedagogiques: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalites_evaluation: Option<String>,
    pub est_actif: bool,
    pub est_visible: bool,
    /// Set when the programme was generated from a rendez-vous
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiaire_rendezvous_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProgrammeModel> for ProgrammeDto {
    fn from(model: ProgrammeModel) -> Self {
        Self {
            id: model.id,
            code: model.code,
            titre: model.titre,
            description: model.description,
            duree_heures: model.duree_heures,
            prix_cents: model.prix_cents,
            niveau: model.niveau,
            prerequis: model.prerequis,
            objectifs_pedagogiques: model.objectifs_pedagogiques,
            modalites_evaluation: model.modalites_evaluation,
            est_actif: model.est_actif,
            est_visible: model.est_visible,
            beneficiaire_rendezvous_id: model.beneficiaire_rendezvous_id,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Creation payload for `POST /api/programmes`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgrammeDto {
    pub code: String,
    pub titre: String,
    pub description: Option<String>,
    pub duree_heures: Option<i32>,
    pub prix_cents: Option<i64>,
    pub niveau: Option<String>,
    pub prerequis: Option<String>,
    pub objectifs_pedagogiques: Option<String>,
    pub modalites_evaluation: Option<String>,
}

/// Partial-update payload for `PUT /api/programmes/{id}`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgrammeDto {
    pub titre: Option<String>,
    pub description: Option<String>,
    pub duree_heures: Option<i32>,
    pub prix_cents: Option<i64>,
    pub niveau: Option<String>,
    pub prerequis: Option<String>,
    pub objectifs_pedagogiques: Option<String>,
    pub modalites_evaluation: Option<String>,
    pub est_actif: Option<bool>,
    pub est_visible: Option<bool>,
}

/// Visibility toggle for `PUT /api/programmes/{id}/visibilite`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibiliteDto {
    pub est_visible: Option<bool>,
    pub est_actif: Option<bool>,
}

/// List the programme catalog
#[utoipa::path(
    get,
    path = "/api/programmes",
    responses(
        (status = 200, description = "Programme collection", body = DataResponse<Vec<ProgrammeDto>>)
    ),
    tag = "programmes"
)]
pub async fn list_programmes(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<ProgrammeDto>>>, ApiError> {
    let repo = ProgrammeRepository::new(&state.db);
    let items = repo.list().await?;
    Ok(Json(DataResponse::new(
        items.into_iter().map(ProgrammeDto::from).collect(),
    )))
}

/// Create a programme
#[utoipa::path(
    post,
    path = "/api/programmes",
    request_body = CreateProgrammeDto,
    responses(
        (status = 201, description = "Programme created", body = DataResponse<ProgrammeDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Code already exists", body = ApiError)
    ),
    tag = "programmes"
)]
pub async fn create_programme(
    State(state): State<AppState>,
    Json(request): Json<CreateProgrammeDto>,
) -> Result<(StatusCode, Json<DataResponse<ProgrammeDto>>), ApiError> {
    let repo = ProgrammeRepository::new(&state.db);
    let model = repo
        .create(CreateProgrammeRequest {
            code: request.code,
            titre: request.titre,
            description: request.description,
            duree_heures: request.duree_heures,
            prix_cents: request.prix_cents,
            niveau: request.niveau,
            prerequis: request.prerequis,
            objectifs_pedagogiques: request.objectifs_pedagogiques,
            modalites_evaluation: request.modalites_evaluation,
            beneficiaire_rendezvous_id: None,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ProgrammeDto::from(model))),
    ))
}

/// Get a programme by ID
#[utoipa::path(
    get,
    path = "/api/programmes/{id}",
    params(("id" = Uuid, Path, description = "Programme UUID")),
    responses(
        (status = 200, description = "Programme", body = DataResponse<ProgrammeDto>),
        (status = 404, description = "Programme not found", body = ApiError)
    ),
    tag = "programmes"
)]
pub async fn get_programme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<ProgrammeDto>>, ApiError> {
    let repo = ProgrammeRepository::new(&state.db);
    let model = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Programme introuvable"))?;
    Ok(Json(DataResponse::new(ProgrammeDto::from(model))))
}

/// Update a programme
#[utoipa::path(
    put,
    path = "/api/programmes/{id}",
    params(("id" = Uuid, Path, description = "Programme UUID")),
    request_body = UpdateProgrammeDto,
    responses(
        (status = 200, description = "Programme updated", body = DataResponse<ProgrammeDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Programme not found", body = ApiError)
    ),
    tag = "programmes"
)]
pub async fn update_programme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProgrammeDto>,
) -> Result<Json<DataResponse<ProgrammeDto>>, ApiError> {
    let repo = ProgrammeRepository::new(&state.db);
    let model = repo
        .update(
            id,
            ProgrammeUpdate {
                titre: request.titre,
                description: request.description,
                duree_heures: request.duree_heures,
                prix_cents: request.prix_cents,
                niveau: request.niveau,
                prerequis: request.prerequis,
                objectifs_pedagogiques: request.objectifs_pedagogiques,
                modalites_evaluation: request.modalites_evaluation,
                est_actif: request.est_actif,
                est_visible: request.est_visible,
            },
        )
        .await?;
    Ok(Json(DataResponse::new(ProgrammeDto::from(model))))
}

/// Toggle catalog visibility of a programme
#[utoipa::path(
    put,
    path = "/api/programmes/{id}/visibilite",
    params(("id" = Uuid, Path, description = "Programme UUID")),
    request_body = VisibiliteDto,
    responses(
        (status = 200, description = "Visibility updated", body = DataResponse<ProgrammeDto>),
        (status = 404, description = "Programme not found", body = ApiError)
    ),
    tag = "programmes"
)]
pub async fn toggle_visibilite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VisibiliteDto>,
) -> Result<Json<DataResponse<ProgrammeDto>>, ApiError> {
    let repo = ProgrammeRepository::new(&state.db);
    let model = repo
        .update(
            id,
            ProgrammeUpdate {
                est_visible: request.est_visible,
                est_actif: request.est_actif,
                ..Default::default()
            },
        )
        .await?;
    Ok(Json(DataResponse::new(ProgrammeDto::from(model))))
}

/// Delete a programme
#[utoipa::path(
    delete,
    path = "/api/programmes/{id}",
    params(("id" = Uuid, Path, description = "Programme UUID")),
    responses(
        (status = 204, description = "Programme deleted"),
        (status = 404, description = "Programme not found", body = ApiError)
    ),
    tag = "programmes"
)]
pub async fn delete_programme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ProgrammeRepository::new(&state.db);
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
