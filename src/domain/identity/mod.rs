//! Users and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::{SearchCriteria, SearchPaging};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSearch {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Substring over first or last name
    pub name: Option<String>,
    pub city_id: Option<i32>,
    pub role_id: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for UserSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsertRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    pub city_id: Option<i32>,
    pub is_active: bool,
    /// Replaces the user's roles when present and non-empty
    #[serde(default)]
    pub role_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub city_id: Option<i32>,
    pub city_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<RoleResponse>,
}
