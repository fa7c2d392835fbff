use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::pricing::ServiceSelection;
use crate::shared::{SearchCriteria, SearchPaging};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentSearch {
    pub user_id: Option<i32>,
    pub hairdresser_id: Option<i32>,
    pub status_id: Option<i32>,
    pub hairstyle_id: Option<i32>,
    pub facial_hair_id: Option<i32>,
    pub dying_id: Option<i32>,
    pub is_active: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub appointment_date_from: Option<DateTime<Utc>>,
    pub appointment_date_to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for AppointmentSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpsertRequest {
    pub user_id: i32,
    pub hairdresser_id: i32,
    /// Ignored on create; applied as-is on update
    pub status_id: Option<i32>,
    pub appointment_date: DateTime<Utc>,
    pub hairstyle_id: Option<i32>,
    pub facial_hair_id: Option<i32>,
    pub dying_id: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl AppointmentUpsertRequest {
    pub fn services(&self) -> ServiceSelection {
        ServiceSelection {
            hairstyle_id: self.hairstyle_id,
            facial_hair_id: self.facial_hair_id,
            dying_id: self.dying_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: i32,
    pub final_price: Decimal,
    pub appointment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub user_id: i32,
    pub user_name: String,
    pub hairdresser_id: i32,
    pub hairdresser_name: String,
    pub status_id: i32,
    pub status_name: String,
    pub hairstyle_id: Option<i32>,
    pub hairstyle_name: Option<String>,
    pub hairstyle_price: Option<Decimal>,
    pub hairstyle_image: Option<Vec<u8>>,
    pub facial_hair_id: Option<i32>,
    pub facial_hair_name: Option<String>,
    pub facial_hair_price: Option<Decimal>,
    pub facial_hair_image: Option<Vec<u8>>,
    pub dying_id: Option<i32>,
    pub dying_name: Option<String>,
    pub dying_hex_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewSearch {
    pub user_id: Option<i32>,
    pub hairdresser_id: Option<i32>,
    pub appointment_id: Option<i32>,
    pub rating: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for ReviewSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpsertRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    pub user_id: i32,
    pub appointment_id: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub user_id: i32,
    pub user_full_name: String,
    pub hairdresser_full_name: String,
    pub appointment_id: i32,
    pub appointment: Option<AppointmentResponse>,
}
