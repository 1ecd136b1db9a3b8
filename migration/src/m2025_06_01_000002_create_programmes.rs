//! Migration to create the programmes table.
//!
//! Training-program catalog entries plus personalized programmes generated
//! from a positionnement rendezvous.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Programmes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Programmes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Programmes::Code).text().not_null())
                    .col(ColumnDef::new(Programmes::Titre).text().not_null())
                    .col(ColumnDef::new(Programmes::Description).text().null())
                    .col(ColumnDef::new(Programmes::DureeHeures).integer().null())
                    .col(ColumnDef::new(Programmes::PrixCents).big_integer().null())
                    .col(ColumnDef::new(Programmes::Niveau).text().null())
                    .col(ColumnDef::new(Programmes::Prerequis).text().null())
                    .col(
                        ColumnDef::new(Programmes::ObjectifsPedagogiques)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Programmes::ModalitesEvaluation)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Programmes::EstActif)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Programmes::EstVisible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Programmes::BeneficiaireRendezvousId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Programmes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Programmes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Catalog codes are unique
        manager
            .create_index(
                Index::create()
                    .name("idx_programmes_code")
                    .table(Programmes::Table)
                    .col(Programmes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_programmes_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Programmes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Programmes {
    Table,
    Id,
    Code,
    Titre,
    Description,
    DureeHeures,
    PrixCents,
    Niveau,
    Prerequis,
    ObjectifsPedagogiques,
    ModalitesEvaluation,
    EstActif,
    EstVisible,
    BeneficiaireRendezvousId,
    CreatedAt,
    UpdatedAt,
}
