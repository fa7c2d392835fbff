//! Small named lookup tables: appointment statuses, hair lengths, cities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::{SearchCriteria, SearchPaging};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusSearch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for StatusSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpsertRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LengthSearch {
    pub name: Option<String>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for LengthSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LengthUpsertRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub image: Option<Vec<u8>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<Vec<u8>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitySearch {
    pub name: Option<String>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for CitySearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CityUpsertRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
}
