//! # Rendezvous Repository
//!
//! CRUD operations for rendez-vous records. Every mutation is funneled
//! through [`RendezvousRepository::update`], which stamps `updated_at`,
//! increments the `version` token and enforces the optional
//! expected-version check.

use crate::error::RepositoryError;
use crate::models::rendezvous::{
    ActiveModel as RendezvousActiveModel, Column, Entity as Rendezvous, Model as RendezvousModel,
};
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use uuid::Uuid;

/// Request data for creating a new rendezvous
#[derive(Debug, Clone, Default)]
pub struct CreateRendezvousRequest {
    pub type_rdv: String,
    /// Statut override for programmatic creation (impact planning); form
    /// intake leaves this unset and starts at `nouveau`.
    pub statut: Option<String>,
    pub nom_beneficiaire: Option<String>,
    pub prenom_beneficiaire: Option<String>,
    pub email_beneficiaire: Option<String>,
    pub telephone_beneficiaire: Option<String>,
    pub entreprise: Option<String>,
    pub siret: Option<String>,
    pub besoins_accessibilite: Option<String>,
    pub date_rdv: Option<DateTimeWithTimeZone>,
    pub canal: Option<String>,
    pub duree_minutes: Option<i32>,
    pub lieu: Option<String>,
    pub lien_visio: Option<String>,
    pub objectifs: Option<Value>,
    pub competences_actuelles: Option<String>,
    pub competences_visees: Option<String>,
    pub niveau_beneficiaire: Option<String>,
    pub formation_selectionnee: Option<String>,
    pub date_dispo: Option<String>,
    pub modalite_formation: Option<String>,
    pub rendezvous_parent_id: Option<Uuid>,
    pub date_impact: Option<DateTimeWithTimeZone>,
    pub commentaires: Option<String>,
}

/// Partial update applied to an existing rendezvous; `Some` fields are set,
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RendezvousUpdate {
    pub statut: Option<String>,
    pub canal: Option<String>,
    pub date_rdv: Option<DateTimeWithTimeZone>,
    pub nom_beneficiaire: Option<String>,
    pub prenom_beneficiaire: Option<String>,
    pub email_beneficiaire: Option<String>,
    pub telephone_beneficiaire: Option<String>,
    pub entreprise: Option<String>,
    pub siret: Option<String>,
    pub besoins_accessibilite: Option<String>,
    pub duree_minutes: Option<i32>,
    pub lieu: Option<String>,
    pub lien_visio: Option<String>,
    pub objectifs: Option<Value>,
    pub competences_actuelles: Option<String>,
    pub competences_visees: Option<String>,
    pub niveau_beneficiaire: Option<String>,
    pub formation_selectionnee: Option<String>,
    pub date_dispo: Option<String>,
    pub modalite_formation: Option<String>,
    pub raison_annulation: Option<String>,
    pub synthese: Option<String>,
    pub commentaires: Option<String>,
    pub notes: Option<String>,
    pub date_impact: Option<DateTimeWithTimeZone>,
    pub satisfaction_impact: Option<i32>,
    pub competences_appliquees: Option<String>,
    pub ameliorations_suggerees: Option<String>,
    pub commentaires_impact: Option<String>,
}

/// Optional list filters for the rendezvous collection endpoint
#[derive(Debug, Clone, Default)]
pub struct RendezvousFilter {
    pub statut: Option<String>,
    pub type_rdv: Option<String>,
}

/// Repository for rendezvous database operations
pub struct RendezvousRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RendezvousRepository<'a> {
    /// Create a new RendezvousRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new rendezvous. Statut defaults to `nouveau`; `version`
    /// starts at 1.
    pub async fn create(
        &self,
        request: CreateRendezvousRequest,
    ) -> Result<RendezvousModel, RepositoryError> {
        self.validate_create(&request)?;

        let now = Utc::now();
        let rendezvous = RendezvousActiveModel {
            id: Set(Uuid::new_v4()),
            type_rdv: Set(request.type_rdv),
            statut: Set(request.statut.unwrap_or_else(|| "nouveau".to_string())),
            nom_beneficiaire: Set(request.nom_beneficiaire),
            prenom_beneficiaire: Set(request.prenom_beneficiaire),
            email_beneficiaire: Set(request.email_beneficiaire),
            telephone_beneficiaire: Set(request.telephone_beneficiaire),
            entreprise: Set(request.entreprise),
            siret: Set(request.siret),
            besoins_accessibilite: Set(request.besoins_accessibilite),
            date_rdv: Set(request.date_rdv),
            canal: Set(request.canal),
            duree_minutes: Set(request.duree_minutes),
            lieu: Set(request.lieu),
            lien_visio: Set(request.lien_visio),
            objectifs: Set(request.objectifs),
            competences_actuelles: Set(request.competences_actuelles),
            competences_visees: Set(request.competences_visees),
            niveau_beneficiaire: Set(request.niveau_beneficiaire),
            formation_selectionnee: Set(request.formation_selectionnee),
            date_dispo: Set(request.date_dispo),
            modalite_formation: Set(request.modalite_formation),
            rendezvous_parent_id: Set(request.rendezvous_parent_id),
            date_impact: Set(request.date_impact),
            satisfaction_impact: Set(None),
            competences_appliquees: Set(None),
            ameliorations_suggerees: Set(None),
            commentaires_impact: Set(None),
            synthese: Set(None),
            commentaires: Set(request.commentaires),
            notes: Set(None),
            raison_annulation: Set(None),
            version: Set(1),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = rendezvous
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get a rendezvous by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RendezvousModel>, RepositoryError> {
        let rendezvous = Rendezvous::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rendezvous)
    }

    /// List rendezvous, optionally filtered by statut and type, most recent first
    pub async fn list(
        &self,
        filter: RendezvousFilter,
    ) -> Result<Vec<RendezvousModel>, RepositoryError> {
        let mut query = Rendezvous::find();

        if let Some(statut) = filter.statut {
            query = query.filter(Column::Statut.eq(statut));
        }
        if let Some(type_rdv) = filter.type_rdv {
            query = query.filter(Column::TypeRdv.eq(type_rdv));
        }

        let rendezvous = query
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rendezvous)
    }

    /// Find the impact follow-up referencing the given positionnement, if any
    pub async fn find_impact_for_parent(
        &self,
        parent_id: Uuid,
    ) -> Result<Option<RendezvousModel>, RepositoryError> {
        let rendezvous = Rendezvous::find()
            .filter(Column::RendezvousParentId.eq(parent_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rendezvous)
    }

    /// Apply a partial update. When `expected_version` is provided and does
    /// not match the stored version, the update is rejected with a version
    /// conflict; otherwise last write wins. Every successful update
    /// increments `version` and stamps `updated_at`.
    pub async fn update(
        &self,
        id: Uuid,
        update: RendezvousUpdate,
        expected_version: Option<i32>,
    ) -> Result<RendezvousModel, RepositoryError> {
        let rendezvous = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Rendez-vous introuvable".to_string()))?;

        if let Some(expected) = expected_version {
            if expected != rendezvous.version {
                return Err(RepositoryError::VersionConflict {
                    expected,
                    found: rendezvous.version,
                });
            }
        }

        let current_version = rendezvous.version;
        let mut active = rendezvous.into_active_model();

        if let Some(statut) = update.statut {
            active.statut = Set(statut);
        }
        if let Some(canal) = update.canal {
            active.canal = Set(Some(canal));
        }
        if let Some(date_rdv) = update.date_rdv {
            active.date_rdv = Set(Some(date_rdv));
        }
        if let Some(value) = update.nom_beneficiaire {
            active.nom_beneficiaire = Set(Some(value));
        }
        if let Some(value) = update.prenom_beneficiaire {
            active.prenom_beneficiaire = Set(Some(value));
        }
        if let Some(value) = update.email_beneficiaire {
            active.email_beneficiaire = Set(Some(value));
        }
        if let Some(value) = update.telephone_beneficiaire {
            active.telephone_beneficiaire = Set(Some(value));
        }
        if let Some(value) = update.entreprise {
            active.entreprise = Set(Some(value));
        }
        if let Some(value) = update.siret {
            active.siret = Set(Some(value));
        }
        if let Some(value) = update.besoins_accessibilite {
            active.besoins_accessibilite = Set(Some(value));
        }
        if let Some(value) = update.duree_minutes {
            active.duree_minutes = Set(Some(value));
        }
        if let Some(value) = update.lieu {
            active.lieu = Set(Some(value));
        }
        if let Some(value) = update.lien_visio {
            active.lien_visio = Set(Some(value));
        }
        if let Some(value) = update.objectifs {
            active.objectifs = Set(Some(value));
        }
        if let Some(value) = update.competences_actuelles {
            active.competences_actuelles = Set(Some(value));
        }
        if let Some(value) = update.competences_visees {
            active.competences_visees = Set(Some(value));
        }
        if let Some(value) = update.niveau_beneficiaire {
            active.niveau_beneficiaire = Set(Some(value));
        }
        if let Some(value) = update.formation_selectionnee {
            active.formation_selectionnee = Set(Some(value));
        }
        if let Some(value) = update.date_dispo {
            active.date_dispo = Set(Some(value));
        }
        if let Some(value) = update.modalite_formation {
            active.modalite_formation = Set(Some(value));
        }
        if let Some(value) = update.raison_annulation {
            active.raison_annulation = Set(Some(value));
        }
        if let Some(value) = update.synthese {
            active.synthese = Set(Some(value));
        }
        if let Some(value) = update.commentaires {
            active.commentaires = Set(Some(value));
        }
        if let Some(value) = update.notes {
            active.notes = Set(Some(value));
        }
        if let Some(value) = update.date_impact {
            active.date_impact = Set(Some(value));
        }
        if let Some(value) = update.satisfaction_impact {
            active.satisfaction_impact = Set(Some(value));
        }
        if let Some(value) = update.competences_appliquees {
            active.competences_appliquees = Set(Some(value));
        }
        if let Some(value) = update.ameliorations_suggerees {
            active.ameliorations_suggerees = Set(Some(value));
        }
        if let Some(value) = update.commentaires_impact {
            active.commentaires_impact = Set(Some(value));
        }

        active.version = Set(current_version + 1);
        active.updated_at = Set(Utc::now().into());

        let result = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Delete a rendezvous. Irreversible; there is no soft delete.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let rendezvous = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Rendez-vous introuvable".to_string()))?;

        rendezvous
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Validate creation according to business rules: positionnement intake
    /// requires the beneficiary identity.
    fn validate_create(&self, request: &CreateRendezvousRequest) -> Result<(), RepositoryError> {
        if request.type_rdv.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Le type de rendez-vous est requis",
            ));
        }

        if request.type_rdv == "positionnement" {
            let missing_nom = request
                .nom_beneficiaire
                .as_deref()
                .map_or(true, |v| v.trim().is_empty());
            let missing_prenom = request
                .prenom_beneficiaire
                .as_deref()
                .map_or(true, |v| v.trim().is_empty());
            if missing_nom || missing_prenom {
                return Err(RepositoryError::validation_error(
                    "Nom et prénom du bénéficiaire sont requis pour un positionnement",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positionnement_requires_identity() {
        let db = DatabaseConnection::Disconnected;
        let repo = RendezvousRepository::new(&db);

        let request = CreateRendezvousRequest {
            type_rdv: "positionnement".to_string(),
            nom_beneficiaire: Some("Durand".to_string()),
            ..Default::default()
        };
        assert!(repo.validate_create(&request).is_err());

        let request = CreateRendezvousRequest {
            type_rdv: "positionnement".to_string(),
            nom_beneficiaire: Some("Durand".to_string()),
            prenom_beneficiaire: Some("Claire".to_string()),
            ..Default::default()
        };
        assert!(repo.validate_create(&request).is_ok());
    }

    #[test]
    fn impact_creation_does_not_require_identity() {
        let db = DatabaseConnection::Disconnected;
        let repo = RendezvousRepository::new(&db);

        let request = CreateRendezvousRequest {
            type_rdv: "impact".to_string(),
            ..Default::default()
        };
        assert!(repo.validate_create(&request).is_ok());
    }

    #[test]
    fn empty_type_is_rejected() {
        let db = DatabaseConnection::Disconnected;
        let repo = RendezvousRepository::new(&db);

        let request = CreateRendezvousRequest::default();
        assert!(repo.validate_create(&request).is_err());
    }
}
