//! Analytics rollup shapes

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub top3_products: Vec<TopProduct>,
    pub top3_hairstyles: Vec<TopHairstyle>,
    pub top3_facial_hairs: Vec<TopFacialHair>,
    pub top3_dying_colors: Vec<TopDying>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: i32,
    pub product_name: String,
    pub product_image: Option<Vec<u8>>,
    pub total_quantity_sold: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHairstyle {
    pub hairstyle_id: i32,
    pub hairstyle_name: String,
    pub hairstyle_image: Option<Vec<u8>>,
    pub total_appointments: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopFacialHair {
    pub facial_hair_id: i32,
    pub facial_hair_name: String,
    pub facial_hair_image: Option<Vec<u8>>,
    pub total_appointments: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDying {
    pub dying_id: i32,
    pub dying_name: String,
    pub dying_hex_code: Option<String>,
    pub total_appointments: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HairdresserAnalytics {
    pub hairdresser_id: i32,
    pub year: i32,
    pub month: u32,
    pub total_appointments: i64,
    pub total_revenue: Decimal,
    pub daily_data: Vec<DailyAnalytics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalytics {
    pub date: NaiveDate,
    pub day_number: u32,
    pub appointment_count: i64,
    pub revenue: Decimal,
}
