//! Outbound ports
//!
//! [`NotificationDispatcher`] decouples the outbox relay from the delivery
//! channel (mail queue, message broker). The shipped adapter logs events.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::EventMessage;

#[derive(Debug, Error)]
#[error("Notification dispatch failed: {0}")]
pub struct DispatchError(pub String);

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, message: &EventMessage) -> Result<(), DispatchError>;
}
