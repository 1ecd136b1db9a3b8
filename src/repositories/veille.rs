//! # Veille Repository
//!
//! CRUD operations for compliance-tracking feed items.

use crate::error::RepositoryError;
use crate::models::veille_item::{
    ActiveModel as VeilleActiveModel, Column, Entity as VeilleItem, Model as VeilleModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder, Set,
};
use uuid::Uuid;

const ALLOWED_CATEGORIES: &[&str] = &["reglementaire", "pedagogique", "concurrentielle"];
const ALLOWED_STATUTS: &[&str] = &["nouveau", "lu", "traite"];

/// Request data for creating a veille item
#[derive(Debug, Clone, Default)]
pub struct CreateVeilleRequest {
    pub titre: String,
    pub source_url: Option<String>,
    pub categorie: Option<String>,
    pub commentaire: Option<String>,
}

/// Partial update for a veille item; `Some` fields are set.
#[derive(Debug, Clone, Default)]
pub struct VeilleUpdate {
    pub titre: Option<String>,
    pub source_url: Option<String>,
    pub categorie: Option<String>,
    pub statut: Option<String>,
    pub commentaire: Option<String>,
}

/// Repository for veille database operations
pub struct VeilleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VeilleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new veille item in statut `nouveau`
    pub async fn create(&self, request: CreateVeilleRequest) -> Result<VeilleModel, RepositoryError> {
        if request.titre.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Le titre de l'élément de veille est requis",
            ));
        }

        let categorie = request
            .categorie
            .unwrap_or_else(|| "reglementaire".to_string());
        Self::validate_categorie(&categorie)?;

        let now = Utc::now();
        let item = VeilleActiveModel {
            id: Set(Uuid::new_v4()),
            titre: Set(request.titre),
            source_url: Set(request.source_url),
            categorie: Set(categorie),
            statut: Set("nouveau".to_string()),
            commentaire: Set(request.commentaire),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = item
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get a veille item by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VeilleModel>, RepositoryError> {
        let item = VeilleItem::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(item)
    }

    /// List all veille items, most recent first
    pub async fn list(&self) -> Result<Vec<VeilleModel>, RepositoryError> {
        let items = VeilleItem::find()
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(items)
    }

    /// Apply a partial update
    pub async fn update(&self, id: Uuid, update: VeilleUpdate) -> Result<VeilleModel, RepositoryError> {
        let item = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Élément de veille introuvable".to_string()))?;

        let mut active = item.into_active_model();

        if let Some(titre) = update.titre {
            if titre.trim().is_empty() {
                return Err(RepositoryError::validation_error(
                    "Le titre de l'élément de veille ne peut pas être vide",
                ));
            }
            active.titre = Set(titre);
        }
        if let Some(value) = update.source_url {
            active.source_url = Set(Some(value));
        }
        if let Some(categorie) = update.categorie {
            Self::validate_categorie(&categorie)?;
            active.categorie = Set(categorie);
        }
        if let Some(statut) = update.statut {
            Self::validate_statut(&statut)?;
            active.statut = Set(statut);
        }
        if let Some(value) = update.commentaire {
            active.commentaire = Set(Some(value));
        }

        active.updated_at = Set(Utc::now().into());

        let result = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Delete a veille item
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let item = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Élément de veille introuvable".to_string()))?;

        item.delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    fn validate_categorie(categorie: &str) -> Result<(), RepositoryError> {
        if !ALLOWED_CATEGORIES.contains(&categorie) {
            return Err(RepositoryError::validation_error(format!(
                "Catégorie de veille inconnue: {}",
                categorie
            )));
        }
        Ok(())
    }

    fn validate_statut(statut: &str) -> Result<(), RepositoryError> {
        if !ALLOWED_STATUTS.contains(&statut) {
            return Err(RepositoryError::validation_error(format!(
                "Statut de veille inconnu: {}",
                statut
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_and_statuts_are_validated() {
        assert!(VeilleRepository::validate_categorie("pedagogique").is_ok());
        assert!(VeilleRepository::validate_categorie("autre").is_err());
        assert!(VeilleRepository::validate_statut("lu").is_ok());
        assert!(VeilleRepository::validate_statut("archive").is_err());
    }
}
