//! User entity model
//!
//! Back-office users. Authentication is delegated to an external identity
//! provider, so no credentials are stored; `email` is the join key and is
//! unique.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique e-mail address
    pub email: String,
    pub nom: Option<String>,
    pub prenom: Option<String>,
    /// admin, formateur or consultant
    pub role: String,
    pub est_actif: bool,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
