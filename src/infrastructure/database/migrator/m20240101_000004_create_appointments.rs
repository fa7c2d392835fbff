//! Appointments and their reviews

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_identity::Users;
use super::m20240101_000003_create_salon_services::{Dyings, FacialHairs, Hairstyles, Statuses};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Appointments::FinalPrice)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::AppointmentDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Appointments::UserId).integer().not_null())
                    .col(ColumnDef::new(Appointments::HairdresserId).integer().not_null())
                    .col(ColumnDef::new(Appointments::StatusId).integer().not_null())
                    .col(ColumnDef::new(Appointments::HairstyleId).integer())
                    .col(ColumnDef::new(Appointments::FacialHairId).integer())
                    .col(ColumnDef::new(Appointments::DyingId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_user")
                            .from(Appointments::Table, Appointments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_hairdresser")
                            .from(Appointments::Table, Appointments::HairdresserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_status")
                            .from(Appointments::Table, Appointments::StatusId)
                            .to(Statuses::Table, Statuses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_hairstyle")
                            .from(Appointments::Table, Appointments::HairstyleId)
                            .to(Hairstyles::Table, Hairstyles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_facial_hair")
                            .from(Appointments::Table, Appointments::FacialHairId)
                            .to(FacialHairs::Table, FacialHairs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_dying")
                            .from(Appointments::Table, Appointments::DyingId)
                            .to(Dyings::Table, Dyings::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_hairdresser_date")
                    .table(Appointments::Table)
                    .col(Appointments::HairdresserId)
                    .col(Appointments::AppointmentDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(ColumnDef::new(Reviews::Comment).string())
                    .col(ColumnDef::new(Reviews::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Reviews::UserId).integer().not_null())
                    .col(ColumnDef::new(Reviews::AppointmentId).integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_appointment")
                            .from(Reviews::Table, Reviews::AppointmentId)
                            .to(Appointments::Table, Appointments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Appointments {
    Table,
    Id,
    FinalPrice,
    AppointmentDate,
    CreatedAt,
    IsActive,
    UserId,
    HairdresserId,
    StatusId,
    HairstyleId,
    FacialHairId,
    DyingId,
}

#[derive(Iden)]
pub enum Reviews {
    Table,
    Id,
    Rating,
    Comment,
    IsActive,
    UserId,
    AppointmentId,
    CreatedAt,
}
