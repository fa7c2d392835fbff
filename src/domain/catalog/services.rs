//! Bookable salon services: hairstyles, facial hair styles, dye colours

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::validation::{validate_hex_code, validate_price};
use crate::shared::{SearchCriteria, SearchPaging};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HairstyleSearch {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub length_id: Option<i32>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for HairstyleSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HairstyleUpsertRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub image: Option<Vec<u8>>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub is_active: bool,
    pub length_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HairstyleResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<Vec<u8>>,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub length_id: i32,
    pub length_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacialHairSearch {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for FacialHairSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacialHairUpsertRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub image: Option<Vec<u8>>,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacialHairResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<Vec<u8>>,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DyingSearch {
    pub name: Option<String>,
    pub hex_code: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for DyingSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DyingUpsertRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(custom(function = "validate_hex_code"))]
    pub hex_code: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DyingResponse {
    pub id: i32,
    pub name: String,
    pub hex_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
