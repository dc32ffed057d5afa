use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-state of a notification.
///
/// Transitions: `Unread -> Read` (mark-as-read), `Unread|Read -> Archived`
/// (reserved, no current operation archives); `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    Unread,
    Read,
    Archived,
}

impl NotificationStatus {
    /// Status after a mark-as-read. Archived records stay archived.
    pub fn on_read(self) -> Self {
        match self {
            Self::Unread | Self::Read => Self::Read,
            Self::Archived => Self::Archived,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Info,
    Warning,
    Error,
    Success,
}

/// Canonical persisted notification, the shape returned to callers and
/// published on the delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub recipient_id: String,
    pub status: NotificationStatus,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate for persistence. Carries no id, timestamps, or status: the
/// store assigns identity and timestamps, and every new record starts
/// `UNREAD` no matter what the caller sent.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub recipient_id: String,
    pub kind: NotificationType,
}

/// Inbound create request, accepted by both REST surfaces and the inbound
/// channel address. All fields optional so validation can report every
/// missing/blank field at once; a supplied `status` is accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<NotificationType>,
    #[serde(default)]
    pub status: Option<NotificationStatus>,
}
