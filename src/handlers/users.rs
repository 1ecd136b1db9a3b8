//! # Users API Handlers
//!
//! CRUD endpoints for back-office users.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, not_found};
use crate::models::user::Model as UserModel;
use crate::repositories::{CreateUserRequest, UserRepository, UserUpdate};
use crate::server::AppState;

use super::DataResponse;

/// Wire representation of a user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    /// admin, formateur or consultant
    pub role: String,
    pub est_actif: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserModel> for UserDto {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            nom: model.nom,
            prenom: model.prenom,
            role: model.role,
            est_actif: model.est_actif,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Creation payload for `POST /api/users`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    pub email: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    /// Defaults to consultant
    pub role: Option<String>,
}

/// Partial-update payload for `PUT /api/users/{id}`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub role: Option<String>,
    pub est_actif: Option<bool>,
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "User collection", body = DataResponse<Vec<UserDto>>)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<UserDto>>>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let items = repo.list().await?;
    Ok(Json(DataResponse::new(
        items.into_iter().map(UserDto::from).collect(),
    )))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = DataResponse<UserDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Email already exists", body = ApiError)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserDto>,
) -> Result<(StatusCode, Json<DataResponse<UserDto>>), ApiError> {
    let repo = UserRepository::new(&state.db);
    let model = repo
        .create(CreateUserRequest {
            email: request.email,
            nom: request.nom,
            prenom: request.prenom,
            role: request.role,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(UserDto::from(model))),
    ))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User", body = DataResponse<UserDto>),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let model = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Utilisateur introuvable"))?;
    Ok(Json(DataResponse::new(UserDto::from(model))))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = DataResponse<UserDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserDto>,
) -> Result<Json<DataResponse<UserDto>>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let model = repo
        .update(
            id,
            UserUpdate {
                nom: request.nom,
                prenom: request.prenom,
                role: request.role,
                est_actif: request.est_actif,
            },
        )
        .await?;
    Ok(Json(DataResponse::new(UserDto::from(model))))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = UserRepository::new(&state.db);
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
