//! Notification model (payment reminders)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Delivery state of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
}

/// Notification document created by the payment reminder sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,

    pub lubricentro_id: String,
    pub lubricentro_name: String,

    /// Currently always "payment_reminder"
    pub kind: String,

    pub message: String,

    #[serde(default = "default_status")]
    pub status: NotificationStatus,

    /// The payment date the reminder refers to (Unix millis)
    pub due_date: i64,

    pub created_at: i64,
}

fn default_status() -> NotificationStatus {
    NotificationStatus::Pending
}

pub const KIND_PAYMENT_REMINDER: &str = "payment_reminder";
