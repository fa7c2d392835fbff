//! Notification dispatcher adapters

use async_trait::async_trait;
use tracing::info;

use crate::domain::events::EventMessage;
use crate::domain::ports::{DispatchError, NotificationDispatcher};

/// Writes each event to the log. Stands in for a mail queue.
#[derive(Debug, Default, Clone)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, message: &EventMessage) -> Result<(), DispatchError> {
        let appointment = message.event.appointment();
        info!(
            event_id = %message.event_id,
            event_type = message.event.event_type(),
            appointment_id = appointment.appointment_id,
            to = %appointment.hairdresser_email,
            client = %appointment.user_full_name,
            date = %appointment.appointment_date,
            price = %appointment.final_price,
            "📧 Booking notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::events::{AppointmentNotification, NotificationEvent};

    #[tokio::test]
    async fn log_dispatcher_accepts_every_event() {
        let message = EventMessage {
            event_id: "evt-1".into(),
            created_at: Utc::now(),
            event: NotificationEvent::AppointmentCancelled(AppointmentNotification {
                appointment_id: 9,
                hairdresser_email: "hd@salon.test".into(),
                hairdresser_name: "Hana Dee".into(),
                user_full_name: "Ana Client".into(),
                user_email: "ana@salon.test".into(),
                user_phone_number: Some("+385 1 234".into()),
                appointment_date: Utc::now(),
                final_price: Decimal::from(10),
                status_name: "Cancelled".into(),
                hairstyle_name: None,
                hairstyle_price: None,
                facial_hair_name: None,
                facial_hair_price: None,
                dying_name: Some("Copper".into()),
                dying_hex_code: Some("#B87333".into()),
            }),
        };
        assert!(LogDispatcher.dispatch(&message).await.is_ok());
    }
}
