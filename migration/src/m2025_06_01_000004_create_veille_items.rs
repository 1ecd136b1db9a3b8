//! Migration to create the veille_items table.
//!
//! Lightweight compliance-tracking feed (regulatory/pedagogical watch).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VeilleItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VeilleItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VeilleItems::Titre).text().not_null())
                    .col(ColumnDef::new(VeilleItems::SourceUrl).text().null())
                    .col(
                        ColumnDef::new(VeilleItems::Categorie)
                            .text()
                            .not_null()
                            .default("reglementaire"),
                    )
                    .col(
                        ColumnDef::new(VeilleItems::Statut)
                            .text()
                            .not_null()
                            .default("nouveau"),
                    )
                    .col(ColumnDef::new(VeilleItems::Commentaire).text().null())
                    .col(
                        ColumnDef::new(VeilleItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(VeilleItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VeilleItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VeilleItems {
    Table,
    Id,
    Titre,
    SourceUrl,
    Categorie,
    Statut,
    Commentaire,
    CreatedAt,
    UpdatedAt,
}
