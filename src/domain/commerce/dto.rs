use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::{SearchCriteria, SearchPaging};

// ── Cart ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartSearch {
    pub user_id: Option<i32>,
    pub is_active: Option<bool>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for CartSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartUpsertRequest {
    pub user_id: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub cart_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub product_price: Decimal,
    pub product_picture: Option<Vec<u8>>,
    /// Current product price × quantity
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub user_id: i32,
    pub user_full_name: String,
    pub cart_items: Vec<CartItemResponse>,
    pub total_items: i32,
    pub total_amount: Decimal,
}

impl CartResponse {
    /// Derives the totals from the lines
    pub fn with_totals(mut self) -> Self {
        self.total_items = self.cart_items.iter().map(|i| i.quantity).sum();
        self.total_amount = self.cart_items.iter().map(|i| i.total_price).sum();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub user_id: i32,
    pub cart_id: Option<i32>,
    pub total_items: i32,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartItemSearch {
    pub cart_id: Option<i32>,
    pub product_id: Option<i32>,
    pub user_id: Option<i32>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for CartItemSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemUpsertRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub cart_id: i32,
    pub product_id: i32,
}

// ── Order ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSearch {
    pub user_id: Option<i32>,
    pub user_full_name: Option<String>,
    pub min_total_amount: Option<Decimal>,
    pub max_total_amount: Option<Decimal>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for OrderSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpsertRequest {
    pub total_amount: Decimal,
    pub user_id: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub order_number: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub user_id: i32,
    pub user_full_name: String,
    pub order_items: Vec<OrderItemResponse>,
    /// Number of order lines
    pub total_items: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItemSearch {
    pub order_id: Option<i32>,
    pub product_id: Option<i32>,
    pub user_id: Option<i32>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    pub min_unit_price: Option<Decimal>,
    pub max_unit_price: Option<Decimal>,
    #[serde(flatten)]
    pub paging: SearchPaging,
}

impl SearchCriteria for OrderItemSearch {
    fn paging(&self) -> &SearchPaging {
        &self.paging
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUpsertRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Decimal,
    pub order_id: i32,
    pub product_id: i32,
}

impl OrderItemUpsertRequest {
    /// Line total, always `unit_price * quantity`
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
