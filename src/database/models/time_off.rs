use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum TimeOffType {
        Vacation => "vacation",
        Personal => "personal",
        Sick => "sick",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "snake_case")]
    pub enum TimeOffDuration {
        #[default]
        FullDay => "full_day",
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum TimeOffStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffRequest {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub request_type: TimeOffType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: TimeOffDuration,
    pub status: TimeOffStatus,
    pub reason: Option<String>,
    pub approved_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeOffRequest {
    pub fn is_approved(&self) -> bool {
        self.status == TimeOffStatus::Approved
    }

    /// Inclusive day-range membership.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffRequestInput {
    #[serde(rename = "type")]
    pub request_type: TimeOffType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub duration: TimeOffDuration,
    pub reason: Option<String>,
}

/// Repository-level insert; the owner comes from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewTimeOffRequest {
    pub user_id: i64,
    pub request_type: TimeOffType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: TimeOffDuration,
    pub reason: Option<String>,
}
