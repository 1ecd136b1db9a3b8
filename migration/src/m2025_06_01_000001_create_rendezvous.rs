//! Migration to create the rendezvous table.
//!
//! This migration creates the rendezvous table which stores positioning
//! interviews and their impact follow-up appointments, including the
//! optimistic-concurrency version column.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rendezvous::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rendezvous::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::Type)
                            .text()
                            .not_null()
                            .default("positionnement"),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::Statut)
                            .text()
                            .not_null()
                            .default("nouveau"),
                    )
                    .col(ColumnDef::new(Rendezvous::NomBeneficiaire).text().null())
                    .col(
                        ColumnDef::new(Rendezvous::PrenomBeneficiaire)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Rendezvous::EmailBeneficiaire).text().null())
                    .col(
                        ColumnDef::new(Rendezvous::TelephoneBeneficiaire)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Rendezvous::Entreprise).text().null())
                    .col(ColumnDef::new(Rendezvous::Siret).text().null())
                    .col(
                        ColumnDef::new(Rendezvous::BesoinsAccessibilite)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::DateRdv)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Rendezvous::Canal).text().null())
                    .col(ColumnDef::new(Rendezvous::DureeMinutes).integer().null())
                    .col(ColumnDef::new(Rendezvous::Lieu).text().null())
                    .col(ColumnDef::new(Rendezvous::LienVisio).text().null())
                    .col(ColumnDef::new(Rendezvous::Objectifs).json_binary().null())
                    .col(
                        ColumnDef::new(Rendezvous::CompetencesActuelles)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Rendezvous::CompetencesVisees).text().null())
                    .col(
                        ColumnDef::new(Rendezvous::NiveauBeneficiaire)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::FormationSelectionnee)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Rendezvous::DateDispo).text().null())
                    .col(
                        ColumnDef::new(Rendezvous::ModaliteFormation)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::RendezvousParentId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::DateImpact)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::SatisfactionImpact)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::CompetencesAppliquees)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::AmeliorationsSuggerees)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::CommentairesImpact)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Rendezvous::Synthese).text().null())
                    .col(ColumnDef::new(Rendezvous::Commentaires).text().null())
                    .col(ColumnDef::new(Rendezvous::Notes).text().null())
                    .col(ColumnDef::new(Rendezvous::RaisonAnnulation).text().null())
                    .col(
                        ColumnDef::new(Rendezvous::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Rendezvous::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on statut for the filtered list endpoint
        manager
            .create_index(
                Index::create()
                    .name("idx_rendezvous_statut")
                    .table(Rendezvous::Table)
                    .col(Rendezvous::Statut)
                    .to_owned(),
            )
            .await?;

        // Index on the impact back-reference for parent lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_rendezvous_parent_id")
                    .table(Rendezvous::Table)
                    .col(Rendezvous::RendezvousParentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_rendezvous_parent_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_rendezvous_statut").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rendezvous::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rendezvous {
    Table,
    Id,
    Type,
    Statut,
    NomBeneficiaire,
    PrenomBeneficiaire,
    EmailBeneficiaire,
    TelephoneBeneficiaire,
    Entreprise,
    Siret,
    BesoinsAccessibilite,
    DateRdv,
    Canal,
    DureeMinutes,
    Lieu,
    LienVisio,
    Objectifs,
    CompetencesActuelles,
    CompetencesVisees,
    NiveauBeneficiaire,
    FormationSelectionnee,
    DateDispo,
    ModaliteFormation,
    RendezvousParentId,
    DateImpact,
    SatisfactionImpact,
    CompetencesAppliquees,
    AmeliorationsSuggerees,
    CommentairesImpact,
    Synthese,
    Commentaires,
    Notes,
    RaisonAnnulation,
    Version,
    CreatedAt,
    UpdatedAt,
}
