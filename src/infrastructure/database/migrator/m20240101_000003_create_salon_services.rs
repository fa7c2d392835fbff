//! Bookable services and appointment statuses
//!
//! The three statuses are reference data: booking logic addresses them by id.

use chrono::Utc;
use sea_orm_migration::prelude::*;

const STATUSES: [(i32, &str); 3] = [(1, "Reserved"), (2, "Cancelled"), (3, "Completed")];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Statuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Statuses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Statuses::Name).string().not_null())
                    .col(ColumnDef::new(Statuses::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Statuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Statuses::Table).columns([
            Statuses::Id,
            Statuses::Name,
            Statuses::IsActive,
            Statuses::CreatedAt,
        ]);
        for (id, name) in STATUSES {
            seed.values([id.into(), name.into(), true.into(), Utc::now().into()])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
        }
        manager.exec_stmt(seed).await?;

        manager
            .create_table(
                Table::create()
                    .table(Lengths::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lengths::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lengths::Name).string().not_null())
                    .col(ColumnDef::new(Lengths::Image).binary())
                    .col(ColumnDef::new(Lengths::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Lengths::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Hairstyles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hairstyles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hairstyles::Name).string().not_null())
                    .col(ColumnDef::new(Hairstyles::Image).binary())
                    .col(ColumnDef::new(Hairstyles::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Hairstyles::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Hairstyles::LengthId).integer().not_null())
                    .col(
                        ColumnDef::new(Hairstyles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hairstyles_length")
                            .from(Hairstyles::Table, Hairstyles::LengthId)
                            .to(Lengths::Table, Lengths::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FacialHairs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FacialHairs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FacialHairs::Name).string().not_null())
                    .col(ColumnDef::new(FacialHairs::Image).binary())
                    .col(ColumnDef::new(FacialHairs::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(FacialHairs::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(FacialHairs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Dyings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Dyings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Dyings::Name).string().not_null())
                    .col(ColumnDef::new(Dyings::HexCode).string_len(7))
                    .col(ColumnDef::new(Dyings::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Dyings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dyings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FacialHairs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hairstyles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lengths::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Statuses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Statuses {
    Table,
    Id,
    Name,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
pub enum Lengths {
    Table,
    Id,
    Name,
    Image,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
pub enum Hairstyles {
    Table,
    Id,
    Name,
    Image,
    Price,
    IsActive,
    LengthId,
    CreatedAt,
}

#[derive(Iden)]
pub enum FacialHairs {
    Table,
    Id,
    Name,
    Image,
    Price,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
pub enum Dyings {
    Table,
    Id,
    Name,
    HexCode,
    IsActive,
    CreatedAt,
}
