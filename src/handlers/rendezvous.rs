//! # Rendez-vous API Handlers
//!
//! Handlers for the rendez-vous collection and lifecycle endpoints. Inbound
//! payloads go through the envelope parser and the field normalizer before
//! touching the repository; statut changes go through the lifecycle service.

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, invalid_envelope, not_found, validation_error};
use crate::lifecycle::{
    ImpactEvaluation, LifecycleService, validate_email, validate_phone,
};
use crate::models::rendezvous::Model as RendezvousModel;
use crate::normalization::{Envelope, RendezvousDraft, map_api_data_to_rendezvous, parse_envelope};
use crate::repositories::{
    CreateRendezvousRequest, RendezvousFilter, RendezvousRepository, RendezvousUpdate,
};
use crate::server::AppState;

use super::DataResponse;

/// Wire representation of a rendezvous record
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RendezvousDto {
    /// Unique identifier (UUID)
    pub id: Uuid,
    /// Appointment kind: positionnement, impact, suivi, information
    #[serde(rename = "type")]
    pub type_rdv: String,
    /// Lifecycle statut
    pub statut: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom_beneficiaire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom_beneficiaire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_beneficiaire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone_beneficiaire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entreprise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub besoins_accessibilite: Option<String>,
    /// Nominal appointment instant (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_rdv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duree_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lieu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lien_visio: Option<String>,
    /// JSON array of strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectifs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competences_actuelles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competences_visees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub niveau_beneficiaire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formation_selectionnee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_dispo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modalite_formation: Option<String>,
    /// Back-reference to the originating positionnement (impact rows only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendezvous_parent_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfaction_impact: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competences_appliquees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ameliorations_suggerees: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaires_impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthese: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raison_annulation: Option<String>,
    /// Optimistic-concurrency token
    pub version: i32,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last-mutation timestamp (ISO 8601)
    pub updated_at: String,
}

impl From<RendezvousModel> for RendezvousDto {
    fn from(model: RendezvousModel) -> Self {
        Self {
            id: model.id,
            type_rdv: model.type_rdv,
            statut: model.statut,
            nom_beneficiaire: model.nom_beneficiaire,
            prenom_beneficiaire: model.prenom_beneficiaire,
            email_beneficiaire: model.email_beneficiaire,
            telephone_beneficiaire: model.telephone_beneficiaire,
            entreprise: model.entreprise,
            siret: model.siret,
            besoins_accessibilite: model.besoins_accessibilite,
            date_rdv: model.date_rdv.map(|d| d.to_rfc3339()),
            canal: model.canal,
            duree_minutes: model.duree_minutes,
            lieu: model.lieu,
            lien_visio: model.lien_visio,
            objectifs: model.objectifs,
            competences_actuelles: model.competences_actuelles,
            competences_visees: model.competences_visees,
            niveau_beneficiaire: model.niveau_beneficiaire,
            formation_selectionnee: model.formation_selectionnee,
            date_dispo: model.date_dispo,
            modalite_formation: model.modalite_formation,
            rendezvous_parent_id: model.rendezvous_parent_id,
            date_impact: model.date_impact.map(|d| d.to_rfc3339()),
            satisfaction_impact: model.satisfaction_impact,
            competences_appliquees: model.competences_appliquees,
            ameliorations_suggerees: model.ameliorations_suggerees,
            commentaires_impact: model.commentaires_impact,
            synthese: model.synthese,
            commentaires: model.commentaires,
            notes: model.notes,
            raison_annulation: model.raison_annulation,
            version: model.version,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Collection filters for `GET /api/rendezvous`
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRendezvousQuery {
    /// Filter by lifecycle statut
    pub statut: Option<String>,
    /// Filter by appointment kind
    #[serde(rename = "type")]
    pub type_rdv: Option<String>,
}

/// Statut-change payload for `PUT /api/rendezvous/{id}/statut`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatutDto {
    /// Target statut
    pub statut: String,
    /// Version observed by the client; mismatch is rejected with 409
    pub expected_version: Option<i32>,
}

/// Intake-validation payload for `PUT /api/rendezvous/{id}/valider`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValiderDto {
    /// Appointment canal (legacy name kept on the wire)
    pub format_rdv: Option<String>,
    /// Appointment instant (ISO 8601)
    pub date_rdv: Option<String>,
    pub expected_version: Option<i32>,
}

/// Cancellation payload for `POST /api/rendezvous/{id}/annuler`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnulerDto {
    pub raison: Option<String>,
    pub expected_version: Option<i32>,
}

/// Reschedule payload for `POST /api/rendezvous/{id}/reprogrammer`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReprogrammerDto {
    /// New appointment instant (ISO 8601, required)
    pub date_rdv: String,
    pub format_rdv: Option<String>,
    pub expected_version: Option<i32>,
}

/// Impact-planning payload for `POST /api/rendezvous/{id}/impact/planifier`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanifierImpactDto {
    /// Follow-up instant (ISO 8601); defaults to now plus the configured delay
    pub date_impact: Option<String>,
}

/// Impact-evaluation payload
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEvaluationDto {
    /// Satisfaction on the configured scale (1..=max)
    pub satisfaction_impact: Option<i32>,
    pub competences_appliquees: Option<String>,
    pub ameliorations_suggerees: Option<String>,
    pub commentaires_impact: Option<String>,
    pub expected_version: Option<i32>,
}

/// Version-only payload for closing operations
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedVersionDto {
    pub expected_version: Option<i32>,
}

/// Compte-rendu payload for `PUT /api/rendezvous/{id}/compte-rendu`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompteRenduDto {
    /// Interview synthesis (required)
    pub synthese: String,
    pub notes: Option<String>,
    pub expected_version: Option<i32>,
}

fn parse_date(field: &str, value: &str) -> Result<DateTimeWithTimeZone, ApiError> {
    chrono::DateTime::parse_from_rfc3339(value).map_err(|_| {
        validation_error(
            "Date invalide",
            json!({ "field": field, "value": value, "expected": "ISO 8601" }),
        )
    })
}

/// Validate beneficiary contact fields carried by a draft.
fn validate_contact(draft: &RendezvousDraft) -> Result<(), ApiError> {
    if let Some(email) = &draft.email_beneficiaire {
        if !validate_email(email) {
            return Err(validation_error(
                "Adresse email invalide",
                json!({ "field": "emailBeneficiaire", "value": email }),
            ));
        }
    }
    if let Some(telephone) = &draft.telephone_beneficiaire {
        if !validate_phone(telephone) {
            return Err(validation_error(
                "Numéro de téléphone invalide",
                json!({ "field": "telephoneBeneficiaire", "value": telephone }),
            ));
        }
    }
    Ok(())
}

fn statut_from_draft(draft: &RendezvousDraft) -> Result<Option<String>, ApiError> {
    match &draft.statut {
        Some(statut) => {
            let parsed = crate::lifecycle::parse_statut(statut).ok_or_else(|| {
                validation_error(
                    "Statut inconnu",
                    json!({ "field": "statut", "value": statut }),
                )
            })?;
            Ok(Some(parsed.as_str().to_string()))
        }
        None => Ok(None),
    }
}

fn objectifs_value(draft: &RendezvousDraft) -> Option<Value> {
    draft.objectifs.as_ref().map(|items| json!(items))
}

async fn create_one(
    repo: &RendezvousRepository<'_>,
    item: &Value,
) -> Result<RendezvousDto, ApiError> {
    let draft = map_api_data_to_rendezvous(item);
    validate_contact(&draft)?;

    let statut = statut_from_draft(&draft)?;
    let date_rdv = draft
        .date_rdv
        .as_deref()
        .map(|value| parse_date("dateRdv", value))
        .transpose()?;

    let request = CreateRendezvousRequest {
        type_rdv: draft
            .type_rdv
            .clone()
            .unwrap_or_else(|| "positionnement".to_string()),
        statut,
        nom_beneficiaire: draft.nom_beneficiaire.clone(),
        prenom_beneficiaire: draft.prenom_beneficiaire.clone(),
        email_beneficiaire: draft.email_beneficiaire.clone(),
        telephone_beneficiaire: draft.telephone_beneficiaire.clone(),
        entreprise: draft.entreprise.clone(),
        siret: draft.siret.clone(),
        besoins_accessibilite: draft.besoins_accessibilite.clone(),
        date_rdv,
        canal: draft.canal.clone(),
        duree_minutes: draft.duree_minutes,
        lieu: draft.lieu.clone(),
        lien_visio: draft.lien_visio.clone(),
        objectifs: objectifs_value(&draft),
        competences_actuelles: draft.competences_actuelles.clone(),
        competences_visees: draft.competences_visees.clone(),
        niveau_beneficiaire: draft.niveau_beneficiaire.clone(),
        formation_selectionnee: draft.formation_selectionnee.clone(),
        date_dispo: draft.date_dispo.clone(),
        modalite_formation: draft.modalite_formation.clone(),
        rendezvous_parent_id: None,
        date_impact: None,
        commentaires: draft.commentaires.clone(),
    };

    let model = repo.create(request).await?;
    Ok(RendezvousDto::from(model))
}

/// List rendez-vous, optionally filtered by statut and type
#[utoipa::path(
    get,
    path = "/api/rendezvous",
    params(ListRendezvousQuery),
    responses(
        (status = 200, description = "Rendez-vous collection", body = DataResponse<Vec<RendezvousDto>>),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn list_rendezvous(
    State(state): State<AppState>,
    Query(query): Query<ListRendezvousQuery>,
) -> Result<Json<DataResponse<Vec<RendezvousDto>>>, ApiError> {
    let repo = RendezvousRepository::new(&state.db);
    let filter = RendezvousFilter {
        statut: query.statut,
        type_rdv: query.type_rdv,
    };
    let items = repo.list(filter).await?;
    Ok(Json(DataResponse::new(
        items.into_iter().map(RendezvousDto::from).collect(),
    )))
}

/// Create rendez-vous from an inbound payload.
///
/// The payload may arrive as `{"data": [...]}`, `{"data": {...}}`, a bare
/// array or a bare object; any other wrapping yields 422. A collection
/// creates one record per element.
#[utoipa::path(
    post,
    path = "/api/rendezvous",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Rendez-vous created", body = serde_json::Value),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 422, description = "Unrecognized payload envelope", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn create_rendezvous(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Response, ApiError> {
    let envelope = parse_envelope(&payload).map_err(|_| invalid_envelope())?;
    let repo = RendezvousRepository::new(&state.db);

    match envelope {
        Envelope::Item(item) => {
            let dto = create_one(&repo, &item).await?;
            let location = format!("/api/rendezvous/{}", dto.id);
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(json!({ "data": dto })),
            )
                .into_response())
        }
        Envelope::Items(items) => {
            let mut created = Vec::with_capacity(items.len());
            for item in &items {
                created.push(create_one(&repo, item).await?);
            }
            Ok((StatusCode::CREATED, Json(json!({ "data": created }))).into_response())
        }
    }
}

/// Get a rendez-vous by ID
#[utoipa::path(
    get,
    path = "/api/rendezvous/{id}",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    responses(
        (status = 200, description = "Rendez-vous", body = DataResponse<RendezvousDto>),
        (status = 404, description = "Rendez-vous not found", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn get_rendezvous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let repo = RendezvousRepository::new(&state.db);
    let model = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found("Rendez-vous introuvable"))?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Update a rendez-vous from a normalized payload.
///
/// Accepts the same envelope shapes as creation, restricted to a single
/// record. A `statut` field in the payload is checked against the transition
/// table. `expectedVersion`, when present, enables the optimistic-concurrency
/// check.
#[utoipa::path(
    put,
    path = "/api/rendezvous/{id}",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Rendez-vous updated", body = DataResponse<RendezvousDto>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Statut or version conflict", body = ApiError),
        (status = 422, description = "Unrecognized payload envelope", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn update_rendezvous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Value>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let item = match parse_envelope(&payload).map_err(|_| invalid_envelope())? {
        Envelope::Item(item) => item,
        Envelope::Items(mut items) if items.len() == 1 => items.remove(0),
        Envelope::Items(_) => return Err(invalid_envelope()),
    };

    let expected_version = item
        .get("expectedVersion")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let draft = map_api_data_to_rendezvous(&item);
    validate_contact(&draft)?;

    let date_rdv = draft
        .date_rdv
        .as_deref()
        .map(|value| parse_date("dateRdv", value))
        .transpose()?;

    let update = RendezvousUpdate {
        canal: draft.canal.clone(),
        date_rdv,
        nom_beneficiaire: draft.nom_beneficiaire.clone(),
        prenom_beneficiaire: draft.prenom_beneficiaire.clone(),
        email_beneficiaire: draft.email_beneficiaire.clone(),
        telephone_beneficiaire: draft.telephone_beneficiaire.clone(),
        entreprise: draft.entreprise.clone(),
        siret: draft.siret.clone(),
        besoins_accessibilite: draft.besoins_accessibilite.clone(),
        duree_minutes: draft.duree_minutes,
        lieu: draft.lieu.clone(),
        lien_visio: draft.lien_visio.clone(),
        objectifs: objectifs_value(&draft),
        competences_actuelles: draft.competences_actuelles.clone(),
        competences_visees: draft.competences_visees.clone(),
        niveau_beneficiaire: draft.niveau_beneficiaire.clone(),
        formation_selectionnee: draft.formation_selectionnee.clone(),
        date_dispo: draft.date_dispo.clone(),
        modalite_formation: draft.modalite_formation.clone(),
        synthese: draft.synthese.clone(),
        commentaires: draft.commentaires.clone(),
        notes: draft.notes.clone(),
        ..Default::default()
    };

    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service
        .mettre_a_jour(id, update, draft.statut.as_deref(), expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Delete a rendez-vous
#[utoipa::path(
    delete,
    path = "/api/rendezvous/{id}",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    responses(
        (status = 204, description = "Rendez-vous deleted"),
        (status = 404, description = "Rendez-vous not found", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn delete_rendezvous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = RendezvousRepository::new(&state.db);
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change the lifecycle statut of a rendez-vous
#[utoipa::path(
    put,
    path = "/api/rendezvous/{id}/statut",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    request_body = ChangeStatutDto,
    responses(
        (status = 200, description = "Statut changed", body = DataResponse<RendezvousDto>),
        (status = 400, description = "Unknown statut", body = ApiError),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Illegal transition or version conflict", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn change_statut(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeStatutDto>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service
        .changer_statut(id, &request.statut, request.expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Validate the intake: plan the rendez-vous
#[utoipa::path(
    put,
    path = "/api/rendezvous/{id}/valider",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    request_body = ValiderDto,
    responses(
        (status = 200, description = "Rendez-vous planned", body = DataResponse<RendezvousDto>),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Cancelled rendez-vous or version conflict", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn valider_rendezvous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ValiderDto>>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let request = body.map(|Json(dto)| dto).unwrap_or_default();
    let date_rdv = request
        .date_rdv
        .as_deref()
        .map(|value| parse_date("dateRdv", value))
        .transpose()?;

    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service
        .valider(id, request.format_rdv, date_rdv, request.expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Cancel a rendez-vous
#[utoipa::path(
    post,
    path = "/api/rendezvous/{id}/annuler",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    request_body = AnnulerDto,
    responses(
        (status = 200, description = "Rendez-vous cancelled", body = DataResponse<RendezvousDto>),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Version conflict", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn annuler_rendezvous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<AnnulerDto>>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let request = body.map(|Json(dto)| dto).unwrap_or_default();
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service
        .annuler(id, request.raison, request.expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Reschedule a rendez-vous
#[utoipa::path(
    post,
    path = "/api/rendezvous/{id}/reprogrammer",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    request_body = ReprogrammerDto,
    responses(
        (status = 200, description = "Rendez-vous rescheduled", body = DataResponse<RendezvousDto>),
        (status = 400, description = "Invalid date", body = ApiError),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Terminal statut or version conflict", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn reprogrammer_rendezvous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReprogrammerDto>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let date_rdv = parse_date("dateRdv", &request.date_rdv)?;
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service
        .reprogrammer(id, date_rdv, request.format_rdv, request.expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Plan the impact follow-up for a positionnement
#[utoipa::path(
    post,
    path = "/api/rendezvous/{id}/impact/planifier",
    params(("id" = Uuid, Path, description = "Positionnement UUID")),
    request_body = PlanifierImpactDto,
    responses(
        (status = 201, description = "Impact follow-up created", body = serde_json::Value),
        (status = 400, description = "Not a positionnement", body = ApiError),
        (status = 404, description = "Rendez-vous not found", body = ApiError)
    ),
    tag = "impact"
)]
pub async fn planifier_impact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<PlanifierImpactDto>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = body.map(|Json(dto)| dto).unwrap_or_default();
    let date_impact = request
        .date_impact
        .as_deref()
        .map(|value| parse_date("dateImpact", value))
        .transpose()?;

    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service.planifier_impact(id, date_impact).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "data": { "rendezvous": RendezvousDto::from(model) } })),
    ))
}

/// Record the impact evaluation; a successful call completes it
#[utoipa::path(
    put,
    path = "/api/rendezvous/{id}/impact/evaluation",
    params(("id" = Uuid, Path, description = "Impact rendez-vous UUID")),
    request_body = ImpactEvaluationDto,
    responses(
        (status = 200, description = "Evaluation recorded", body = DataResponse<RendezvousDto>),
        (status = 400, description = "Validation failed or wrong type", body = ApiError),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Version conflict", body = ApiError)
    ),
    tag = "impact"
)]
pub async fn evaluation_impact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ImpactEvaluationDto>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let evaluation = ImpactEvaluation {
        satisfaction_impact: request.satisfaction_impact,
        competences_appliquees: request.competences_appliquees,
        ameliorations_suggerees: request.ameliorations_suggerees,
        commentaires_impact: request.commentaires_impact,
    };
    let model = service
        .completer_evaluation_impact(id, evaluation, request.expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Close an impact follow-up
#[utoipa::path(
    put,
    path = "/api/rendezvous/{id}/impact/terminer",
    params(("id" = Uuid, Path, description = "Impact rendez-vous UUID")),
    request_body = ExpectedVersionDto,
    responses(
        (status = 200, description = "Impact follow-up closed", body = DataResponse<RendezvousDto>),
        (status = 400, description = "Wrong type", body = ApiError),
        (status = 404, description = "Rendez-vous not found", body = ApiError)
    ),
    tag = "impact"
)]
pub async fn terminer_impact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ExpectedVersionDto>>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    let request = body.map(|Json(dto)| dto).unwrap_or_default();
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service.terminer_impact(id, request.expected_version).await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Location of the impact report for a rendez-vous
#[utoipa::path(
    get,
    path = "/api/rendezvous/{id}/impact/rapport",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    responses(
        (status = 200, description = "Report location", body = serde_json::Value),
        (status = 404, description = "Rendez-vous not found", body = ApiError)
    ),
    tag = "impact"
)]
pub async fn rapport_impact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let url = service.rapport_impact_url(id).await?;
    Ok(Json(json!({ "rapportUrl": url })))
}

/// Record the compte rendu of an interview
#[utoipa::path(
    put,
    path = "/api/rendezvous/{id}/compte-rendu",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    request_body = CompteRenduDto,
    responses(
        (status = 200, description = "Compte rendu recorded", body = DataResponse<RendezvousDto>),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Terminal statut or version conflict", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn compte_rendu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompteRenduDto>,
) -> Result<Json<DataResponse<RendezvousDto>>, ApiError> {
    if request.synthese.trim().is_empty() {
        return Err(validation_error(
            "La synthèse est requise",
            json!({ "field": "synthese" }),
        ));
    }
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let model = service
        .editer_compte_rendu(id, request.synthese, request.notes, request.expected_version)
        .await?;
    Ok(Json(DataResponse::new(RendezvousDto::from(model))))
}

/// Generate the personalized programme and dossier from a rendez-vous
#[utoipa::path(
    post,
    path = "/api/rendezvous/{id}/generer-programme",
    params(("id" = Uuid, Path, description = "Rendez-vous UUID")),
    responses(
        (status = 201, description = "Programme and dossier generated", body = serde_json::Value),
        (status = 404, description = "Rendez-vous not found", body = ApiError),
        (status = 409, description = "Programme already generated", body = ApiError)
    ),
    tag = "rendezvous"
)]
pub async fn generer_programme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let service = LifecycleService::new(&state.db, state.config.lifecycle.clone());
    let documents = service.generer_programme_et_dossier(id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "programmeId": documents.programme_id,
            "dossierId": documents.dossier_id,
        })),
    ))
}
