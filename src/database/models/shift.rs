use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "lowercase")]
    pub enum ShiftType {
        Work => "work",
        Regular => "regular",
        Vacation => "vacation",
        Leave => "leave",
        Sick => "sick",
        Note => "note",
    }
}

impl ShiftType {
    /// Types that count toward worked hours.
    pub fn is_working(&self) -> bool {
        matches!(self, ShiftType::Work | ShiftType::Regular)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[serde(rename_all = "lowercase")]
    pub enum DayOfWeek {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
    }
}

impl DayOfWeek {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub schedule_id: i64,
    pub user_id: i64,
    pub day: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub shift_type: ShiftType,
    pub notes: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInput {
    pub schedule_id: i64,
    pub user_id: i64,
    pub day: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub shift_type: ShiftType,
    pub notes: Option<String>,
    pub area: Option<String>,
}

/// Partial shift update. `notes` and `area` cannot be cleared back to null
/// through a patch; an empty string is stored instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    pub user_id: Option<i64>,
    pub day: Option<DayOfWeek>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(rename = "type")]
    pub shift_type: Option<ShiftType>,
    pub notes: Option<String>,
    pub area: Option<String>,
}

impl ShiftPatch {
    pub fn shift_type(shift_type: ShiftType) -> Self {
        Self {
            shift_type: Some(shift_type),
            ..Default::default()
        }
    }

    pub fn times(start_time: String, end_time: String) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        }
    }

    pub fn notes(notes: Option<String>) -> Self {
        Self {
            notes: Some(notes.unwrap_or_default()),
            ..Default::default()
        }
    }

    /// Applies the patch to an in-memory copy of a shift.
    pub fn apply(self, shift: &mut Shift) {
        if let Some(user_id) = self.user_id {
            shift.user_id = user_id;
        }
        if let Some(day) = self.day {
            shift.day = day;
        }
        if let Some(start_time) = self.start_time {
            shift.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            shift.end_time = end_time;
        }
        if let Some(shift_type) = self.shift_type {
            shift.shift_type = shift_type;
        }
        if let Some(notes) = self.notes {
            shift.notes = Some(notes);
        }
        if let Some(area) = self.area {
            shift.area = Some(area);
        }
    }
}
