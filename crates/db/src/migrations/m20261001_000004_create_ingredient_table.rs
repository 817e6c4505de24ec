//! Create ingredient table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ingredient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ingredient::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ingredient::Name).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Ingredient::MeasurementUnit)
                            .string_len(25)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: name (prefix search, default ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_ingredient_name")
                    .table(Ingredient::Table)
                    .col(Ingredient::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ingredient::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ingredient {
    Table,
    Id,
    Name,
    MeasurementUnit,
}
