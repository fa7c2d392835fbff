use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::validation::validate_price;
use crate::shared::{SearchCriteria, SearchPaging};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSearch {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub category_id: Option<i32>,
    pub manufacturer_id: Option<i32>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for ProductSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsertRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub picture: Option<Vec<u8>>,
    pub is_active: bool,
    pub category_id: i32,
    pub manufacturer_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub picture: Option<Vec<u8>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub category_id: i32,
    pub category_name: String,
    pub manufacturer_id: i32,
    pub manufacturer_name: String,
}
