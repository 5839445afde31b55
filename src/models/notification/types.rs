use chrono::{DateTime, Utc};
use serde::Serialize;

/// In-app notification addressed to one user about one work order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub work_order_id: i64,
    pub subject: String,
    pub message: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Subject and body shared by every recipient of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub subject: String,
    pub message: String,
}
