// src/models/notification.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Quiz,
    Flashcards,
    Essay,
    Info,
}

/// A notification owned by the current identity's store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    /// Deep link to the generated artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Traceability bag (jobId / contentId / projectId).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// DTO for adding a notification. `id` and `created_at` are filled in when absent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewNotification {
    #[validate(length(min = 1, max = 100))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
    #[validate(length(max = 500))]
    pub href: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

/// Notification list as exposed to the UI, with the derived unread count.
#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<AppNotification>,
    pub unread_count: usize,
}
