//! Veille entity model
//!
//! Compliance-tracking feed entries (regulatory, pedagogical or competitive
//! watch items) with a simple nouveau → lu → traite status.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "veille_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub titre: String,
    pub source_url: Option<String>,
    /// reglementaire, pedagogique or concurrentielle
    pub categorie: String,
    /// nouveau, lu or traite
    pub statut: String,
    pub commentaire: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
