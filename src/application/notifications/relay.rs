//! Notification relay
//!
//! Drains pending outbox rows and hands them to the dispatcher. Failures are
//! recorded on the row and retried on the next tick until `max_attempts`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::NotificationSection;
use crate::domain::events::EventMessage;
use crate::domain::ports::NotificationDispatcher;
use crate::infrastructure::database::entities::notification_outbox;
use crate::shared::{DomainResult, ShutdownSignal};

/// Outcome of one relay pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub dispatched: usize,
    pub failed: usize,
}

async fn record_failure(
    db: &DatabaseConnection,
    row: notification_outbox::Model,
    reason: String,
) -> DomainResult<()> {
    let attempts = row.attempts + 1;
    let event_id = row.event_id.clone();
    let mut entity = row.into_active_model();
    entity.attempts = Set(attempts);
    entity.last_error = Set(Some(reason.clone()));
    entity.update(db).await?;
    warn!(event_id = %event_id, attempts, error = %reason, "Notification dispatch failed");
    Ok(())
}

/// One pass over pending rows, oldest first. Dispatch errors are recorded,
/// never returned; only store failures surface.
pub async fn relay_pending(
    db: &DatabaseConnection,
    dispatcher: &dyn NotificationDispatcher,
    config: &NotificationSection,
) -> DomainResult<RelayReport> {
    let rows = notification_outbox::Entity::find()
        .filter(notification_outbox::Column::DispatchedAt.is_null())
        .filter(notification_outbox::Column::Attempts.lt(config.max_attempts))
        .order_by_asc(notification_outbox::Column::Id)
        .limit(config.batch_size)
        .all(db)
        .await?;

    let mut report = RelayReport::default();
    for row in rows {
        let message: EventMessage = match serde_json::from_str(&row.payload) {
            Ok(message) => message,
            Err(e) => {
                record_failure(db, row, format!("Unreadable payload: {}", e)).await?;
                report.failed += 1;
                continue;
            }
        };

        match dispatcher.dispatch(&message).await {
            Ok(()) => {
                let mut entity = row.into_active_model();
                entity.dispatched_at = Set(Some(Utc::now()));
                entity.update(db).await?;
                debug!(event_id = %message.event_id, "Notification dispatched");
                report.dispatched += 1;
            }
            Err(e) => {
                record_failure(db, row, e.to_string()).await?;
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Background task running [`relay_pending`] on a fixed interval
pub struct NotificationRelay {
    db: DatabaseConnection,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: NotificationSection,
}

impl NotificationRelay {
    pub fn new(
        db: DatabaseConnection,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: NotificationSection,
    ) -> Self {
        Self {
            db,
            dispatcher,
            config,
        }
    }

    pub fn start(self, shutdown: ShutdownSignal) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "📨 Notification relay started (interval: {}s, batch: {})",
                self.config.relay_interval_secs, self.config.batch_size
            );

            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.relay_interval_secs.max(1)));

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match relay_pending(&self.db, self.dispatcher.as_ref(), &self.config).await {
                            Ok(report) if report != RelayReport::default() => {
                                info!(dispatched = report.dispatched, failed = report.failed, "📨 Relay pass finished");
                            }
                            Ok(_) => {}
                            Err(e) => warn!(error = %e, "Notification relay pass failed"),
                        }
                    }
                    _ = shutdown.notified().wait() => {
                        info!("📨 Notification relay shutting down");
                        break;
                    }
                }
            }

            info!("📨 Notification relay stopped");
        })
    }
}
