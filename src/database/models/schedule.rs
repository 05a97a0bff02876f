use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Whether the inclusive range of this schedule intersects `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
