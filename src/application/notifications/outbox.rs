//! Writes notification intent next to the business change that caused it

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tracing::debug;
use uuid::Uuid;

use crate::domain::events::{EventMessage, NotificationEvent};
use crate::infrastructure::database::entities::notification_outbox;
use crate::shared::DomainResult;

/// Inserts a pending outbox row. Call with the transaction that performs
/// the business write so both commit or neither does.
pub async fn enqueue<C: ConnectionTrait>(
    db: &C,
    event: NotificationEvent,
) -> DomainResult<notification_outbox::Model> {
    let message = EventMessage {
        event_id: Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        event,
    };
    let payload = serde_json::to_string(&message)?;

    let row = notification_outbox::ActiveModel {
        event_id: Set(message.event_id.clone()),
        event_type: Set(message.event.event_type().to_string()),
        payload: Set(payload),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(message.created_at),
        dispatched_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(
        event_id = %row.event_id,
        event_type = %row.event_type,
        "Notification queued"
    );
    Ok(row)
}
