//! # User Repository
//!
//! CRUD operations for back-office users. `email` uniqueness is enforced by
//! the database.

use crate::error::RepositoryError;
use crate::lifecycle::validate_email;
use crate::models::user::{
    ActiveModel as UserActiveModel, Column, Entity as User, Model as UserModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

const ALLOWED_ROLES: &[&str] = &["admin", "formateur", "consultant"];

/// Request data for creating a new user
#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub email: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub role: Option<String>,
}

/// Partial update for a user; `Some` fields are set.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub role: Option<String>,
    pub est_actif: Option<bool>,
}

/// Repository for user database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserModel, RepositoryError> {
        if !validate_email(&request.email) {
            return Err(RepositoryError::validation_error("Adresse email invalide"));
        }

        let role = request.role.unwrap_or_else(|| "consultant".to_string());
        Self::validate_role(&role)?;

        let now = Utc::now();
        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(request.email),
            nom: Set(request.nom),
            prenom: Set(request.prenom),
            role: Set(role),
            est_actif: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = user
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Get a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    /// Get a user by e-mail address
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        let user = User::find()
            .filter(Column::Email.eq(email))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(user)
    }

    /// List all users, e-mail order
    pub async fn list(&self) -> Result<Vec<UserModel>, RepositoryError> {
        let users = User::find()
            .order_by_asc(Column::Email)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(users)
    }

    /// Apply a partial update
    pub async fn update(&self, id: Uuid, update: UserUpdate) -> Result<UserModel, RepositoryError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Utilisateur introuvable".to_string()))?;

        let mut active = user.into_active_model();

        if let Some(value) = update.nom {
            active.nom = Set(Some(value));
        }
        if let Some(value) = update.prenom {
            active.prenom = Set(Some(value));
        }
        if let Some(role) = update.role {
            Self::validate_role(&role)?;
            active.role = Set(role);
        }
        if let Some(value) = update.est_actif {
            active.est_actif = Set(value);
        }

        active.updated_at = Set(Utc::now().into());

        let result = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }

    /// Delete a user
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Utilisateur introuvable".to_string()))?;

        user.delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    fn validate_role(role: &str) -> Result<(), RepositoryError> {
        if !ALLOWED_ROLES.contains(&role) {
            return Err(RepositoryError::validation_error(format!(
                "Rôle inconnu: {} (attendu: admin, formateur ou consultant)",
                role
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_accepted() {
        for role in ALLOWED_ROLES {
            assert!(UserRepository::validate_role(role).is_ok());
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(UserRepository::validate_role("superviseur").is_err());
    }
}
