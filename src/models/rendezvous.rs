//! Rendezvous entity model
//!
//! This module contains the SeaORM entity model for the rendezvous table,
//! which stores positionnement interviews and their impact follow-ups.
//! Impact rows reference their originating positionnement through
//! `rendezvous_parent_id` (non-owning back-reference).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Rendezvous entity representing a schedulable appointment record
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rendezvous")]
pub struct Model {
    /// Unique identifier for the rendezvous (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Appointment kind: positionnement, impact, suivi, information
    #[sea_orm(column_name = "type")]
    pub type_rdv: String,

    /// Lifecycle statut (see `lifecycle::Statut`)
    pub statut: String,

    pub nom_beneficiaire: Option<String>,
    pub prenom_beneficiaire: Option<String>,
    pub email_beneficiaire: Option<String>,
    pub telephone_beneficiaire: Option<String>,
    pub entreprise: Option<String>,
    pub siret: Option<String>,
    pub besoins_accessibilite: Option<String>,

    /// Nominal appointment instant
    pub date_rdv: Option<DateTimeWithTimeZone>,
    /// visio, presentiel or telephone
    pub canal: Option<String>,
    pub duree_minutes: Option<i32>,
    pub lieu: Option<String>,
    pub lien_visio: Option<String>,

    /// Canonical representation: JSON array of strings
    pub objectifs: Option<Json>,
    pub competences_actuelles: Option<String>,
    pub competences_visees: Option<String>,
    pub niveau_beneficiaire: Option<String>,
    pub formation_selectionnee: Option<String>,
    pub date_dispo: Option<String>,
    pub modalite_formation: Option<String>,

    /// Back-reference to the originating positionnement (impact rows only)
    pub rendezvous_parent_id: Option<Uuid>,
    pub date_impact: Option<DateTimeWithTimeZone>,
    /// 1..=configured scale max when present
    pub satisfaction_impact: Option<i32>,
    pub competences_appliquees: Option<String>,
    pub ameliorations_suggerees: Option<String>,
    pub commentaires_impact: Option<String>,

    pub synthese: Option<String>,
    pub commentaires: Option<String>,
    pub notes: Option<String>,
    pub raison_annulation: Option<String>,

    /// Optimistic-concurrency token, incremented on every mutation
    pub version: i32,

    /// Timestamp when the rendezvous was created
    pub created_at: DateTimeWithTimeZone,
    /// Timestamp of the last mutation
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
