use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum NotificationType {
        ScheduleUpdate => "schedule_update",
        ShiftUpdate => "shift_update",
        TimeOffRequest => "time_off_request",
        RequestApproved => "request_approved",
        RequestRejected => "request_rejected",
        DocumentUpload => "document_upload",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub data: serde_json::Value,
}
