use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{DocumentStore, StoreError};

use super::collections;

/// User-facing event classes recorded by the core workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationSubmitted,
    ApplicationStatusChanged,
    AdmissionSelected,
}

/// Payload handed to the sink. Delivery is someone else's problem; the core
/// only records that the event happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub related_application_id: Option<String>,
}

/// Persisted notification document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub related_application_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification sink unavailable: {0}")]
    Sink(String),
}

/// Outbound notification hook. Every call site treats failures as
/// best-effort: they are logged and never roll back the primary operation.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, draft: NotificationDraft) -> Result<(), NotificationError>;
}

/// Sink persisting notifications into the document store for a downstream
/// delivery system to drain.
pub struct StoreNotificationSink<S> {
    store: Arc<S>,
}

impl<S> StoreNotificationSink<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> NotificationSink for StoreNotificationSink<S>
where
    S: DocumentStore,
{
    fn emit(&self, draft: NotificationDraft) -> Result<(), NotificationError> {
        let document = serde_json::json!({
            "user_id": draft.user_id,
            "kind": draft.kind,
            "title": draft.title,
            "message": draft.message,
            "related_application_id": draft.related_application_id,
            "read": false,
            "created_at": Utc::now(),
        });

        self.store
            .create(collections::NOTIFICATIONS, document)
            .map(|_| ())
            .map_err(|error: StoreError| NotificationError::Sink(error.to_string()))
    }
}
