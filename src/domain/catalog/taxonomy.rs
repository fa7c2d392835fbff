//! Product categories and manufacturers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::{SearchCriteria, SearchPaging};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategorySearch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for CategorySearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpsertRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1–100 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManufacturerSearch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for ManufacturerSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerUpsertRequest {
    #[validate(length(min = 1, max = 150, message = "name must be 1–150 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
