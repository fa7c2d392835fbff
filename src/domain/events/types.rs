//! Booking notification events
//!
//! Serialised into the notification outbox and handed to the dispatcher.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NotificationEvent {
    AppointmentCreated(AppointmentNotification),
    AppointmentCancelled(AppointmentNotification),
}

impl NotificationEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            NotificationEvent::AppointmentCreated(_) => "appointment_created",
            NotificationEvent::AppointmentCancelled(_) => "appointment_cancelled",
        }
    }

    pub fn appointment(&self) -> &AppointmentNotification {
        match self {
            NotificationEvent::AppointmentCreated(n) | NotificationEvent::AppointmentCancelled(n) => n,
        }
    }
}

/// Everything the mailer needs to render a booking email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentNotification {
    pub appointment_id: i32,
    pub hairdresser_email: String,
    pub hairdresser_name: String,
    pub user_full_name: String,
    pub user_email: String,
    pub user_phone_number: Option<String>,
    pub appointment_date: DateTime<Utc>,
    pub final_price: Decimal,
    pub status_name: String,
    pub hairstyle_name: Option<String>,
    pub hairstyle_price: Option<Decimal>,
    pub facial_hair_name: Option<String>,
    pub facial_hair_price: Option<Decimal>,
    pub dying_name: Option<String>,
    pub dying_hex_code: Option<String>,
}

/// Outbox envelope: the event plus an id the dispatcher can deduplicate on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub event_id: String,
    pub created_at: DateTime<Utc>,
    pub event: NotificationEvent,
}
