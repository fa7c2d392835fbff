//! Appointment entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Derived from the selected services, never taken from the caller
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub final_price: Decimal,

    pub appointment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,

    /// Client
    pub user_id: i32,
    pub hairdresser_id: i32,
    pub status_id: i32,

    pub hairstyle_id: Option<i32>,
    pub facial_hair_id: Option<i32>,
    pub dying_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::Id"
    )]
    Status,
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
