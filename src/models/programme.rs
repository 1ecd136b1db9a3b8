//! ProgrammeFormation entity model
//!
//! Catalog entries and personalized programmes generated from a
//! positionnement rendezvous. `code` is unique across the catalog.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "programmes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Catalog code, unique
    pub code: String,
    pub titre: String,
    pub description: Option<String>,
    pub duree_heures: Option<i32>,
    /// Price in cents to avoid floating point money
    pub prix_cents: Option<i64>,
    pub niveau: Option<String>,
    pub prerequis: Option<String>,
    pub objectifs_pedagogiques: Option<String>,
    pub modalites_evaluation: Option<String>,

    /// Toggled independently from est_visible
    pub est_actif: bool,
    /// Whether the programme appears on public-facing catalog screens
    pub est_visible: bool,

    /// Set when the programme was generated from a rendezvous
    pub beneficiaire_rendezvous_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
