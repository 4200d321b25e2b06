//! User-facing alerts produced as side effects of allocation and review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{NotificationId, UserId};

/// Where the front end should send the user when they click the alert
pub const DASHBOARD_LINK: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    System,
    Fulfillment,
    Ping,
    Urgency,
    Info,
    Donation,
}

/// A stored notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification content before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub link: Option<String>,
}

impl NewNotification {
    /// Alert linking to the dashboard
    pub fn to_dashboard(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            link: Some(DASHBOARD_LINK.to_string()),
        }
    }

    pub fn into_notification(self, id: NotificationId, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            kind: self.kind,
            link: self.link,
            is_read: false,
            created_at,
        }
    }
}
