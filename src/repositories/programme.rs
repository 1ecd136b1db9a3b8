//! # Programme Repository
//!
//! CRUD operations for the training-program catalog. `code` uniqueness is
//! enforced by the database; duplicates surface as conflicts.

use crate::error::RepositoryError;
use crate::models::programme::{
    ActiveModel as ProgrammeActiveModel, Column, Entity as Programme, Model as ProgrammeModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Request data for creating a new programme
#[derive(Debug, Clone, Default)]
pub struct CreateProgrammeRequest {
    pub code: String,
    pub titre: String,
    pub description: Option<String>,
    pub duree_heures: Option<i32>,
    pub prix_cents: Option<i64>,
    pub niveau: Option<String>,
    pub prerequis: Option<String>,
    pub objectifs_pedagogiques: Option<String>,
    pub modalites_evaluation: Option<String>,
    pub beneficiaire_rendezvous_id: Option<Uuid>,
}

/// Partial update for a programme; `Some` fields are set.
#[derive(Debug, Clone, Default)]
pub struct ProgrammeUpdate {
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

/// Repository for programme database operations
pub struct ProgrammeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProgrammeRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new programme
    pub async fn create(
        &self,
        request: CreateProgrammeRequest,
    ) -> Result<ProgrammeModel, RepositoryError> {
        self.validate(&request.code, &request.titre)?;

        let now = Utc::now();
        let programme = ProgrammeActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            titre: Set(request.titre),
            description: Set(request.description),
            duree_heures: Set(request.duree_heures),
            prix_cents: Set(request.prix_cents),
            niveau: Set(request.niveau),
            prerequis: Set(request.prerequis),
            objectifs_pedagogiques: Set(request.objectifs_pedagogiques),
            modalites_evaluation: Set(request.modalites_evaluation),
            est_actif: Set(true),
            est_visible: Set(true),
            beneficiaire_rendezvous_id: Set(request.beneficiaire_rendezvous_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = programme
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get a programme by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProgrammeModel>, RepositoryError> {
        let programme = Programme::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(programme)
    }

    /// Get a programme by catalog code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<ProgrammeModel>, RepositoryError> {
        let programme = Programme::find()
            .filter(Column::Code.eq(code))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(programme)
    }

    /// List programmes, catalog order (code ascending)
    pub async fn list(&self) -> Result<Vec<ProgrammeModel>, RepositoryError> {
        let programmes = Programme::find()
            .order_by_asc(Column::Code)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(programmes)
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: Uuid,
        update: ProgrammeUpdate,
    ) -> Result<ProgrammeModel, RepositoryError> {
        let programme = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Programme introuvable".to_string()))?;

        let mut active = programme.into_active_model();

        if let Some(titre) = update.titre {
            if titre.trim().is_empty() {
                return Err(RepositoryError::validation_error(
                    "Le titre du programme ne peut pas être vide",
                ));
            }
            active.titre = Set(titre);
        }
        if let Some(value) = update.description {
            active.description = Set(Some(value));
        }
        if let Some(value) = update.duree_heures {
            active.duree_heures = Set(Some(value));
        }
        if let Some(value) = update.prix_cents {
            active.prix_cents = Set(Some(value));
        }
        if let Some(value) = update.niveau {
            active.niveau = Set(Some(value));
        }
        if let Some(value) = update.prerequis {
            active.prerequis = Set(Some(value));
        }
        if let Some(value) = update.objectifs_pedagogiques {
            active.objectifs_pedagogiques = Set(Some(value));
        }
        if let Some(value) = update.modalites_evaluation {
            active.modalites_evaluation = Set(Some(value));
        }
        if let Some(value) = update.est_actif {
            active.est_actif = Set(value);
        }
        if let Some(value) = update.est_visible {
            active.est_visible = Set(value);
        }

        active.updated_at = Set(Utc::now().into());

        let result = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Delete a programme
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let programme = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Programme introuvable".to_string()))?;

        programme
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    fn validate(&self, code: &str, titre: &str) -> Result<(), RepositoryError> {
        if code.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Le code du programme est requis",
            ));
        }
        if titre.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Le titre du programme est requis",
            ));
        }
        Ok(())
    }
}
