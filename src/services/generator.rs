//! Greedy shift generation over a date range.
//!
//! Every user gets an hour budget; each day, each available user with budget
//! left is given one contiguous shift at the start of the opening window.
//! There is no search or balancing beyond that: users are served in input
//! order and a day that cannot fit the shift is skipped.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::{DayOfWeek, ShiftInput, ShiftType, TimeOffRequest, User};
use crate::error::AppError;
use crate::services::schedule_time::{
    MAX_RANGE_DAYS, SLOT_MINUTES, days_between, format_clock, is_bounded_range, parse_clock,
};

const FULL_SHIFT_MINUTES: u32 = 8 * 60;
const HALF_SHIFT_MINUTES: u32 = 4 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorSettings {
    pub min_hours_per_employee: f64,
    pub max_hours_per_employee: f64,
    /// Opening of the daily window, `HH:MM`.
    pub start_hour: String,
    /// Closing of the daily window, `HH:MM`.
    pub end_hour: String,
    pub distribute_evenly: bool,
    pub respect_time_off_requests: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            min_hours_per_employee: 20.0,
            max_hours_per_employee: 40.0,
            start_hour: "08:00".to_string(),
            end_hour: "18:00".to_string(),
            distribute_evenly: true,
            respect_time_off_requests: true,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeneratorError {
    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Date range {start} - {end} is longer than {MAX_RANGE_DAYS} days")]
    RangeTooLong { start: NaiveDate, end: NaiveDate },

    #[error("Invalid time {0}: expected HH:MM on a half-hour boundary")]
    InvalidClock(String),

    #[error("Shift window must open before it closes ({start} - {end})")]
    EmptyWindow { start: String, end: String },

    #[error("Hours per employee must be non-negative numbers")]
    NegativeHours,

    #[error("Minimum hours ({min}) exceed maximum hours ({max})")]
    MinAboveMax { min: f64, max: f64 },
}

impl From<GeneratorError> for AppError {
    fn from(error: GeneratorError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

/// A shift proposed by the generator, not yet attached to a schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedShift {
    pub user_id: i64,
    pub date: NaiveDate,
    pub day: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type")]
    pub shift_type: ShiftType,
}

impl GeneratedShift {
    pub fn minutes(&self) -> u32 {
        match (parse_clock(&self.start_time), parse_clock(&self.end_time)) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    pub fn into_input(self, schedule_id: i64) -> ShiftInput {
        ShiftInput {
            schedule_id,
            user_id: self.user_id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            shift_type: self.shift_type,
            notes: None,
            area: None,
        }
    }
}

/// Validated window, in minutes after midnight.
struct Window {
    start: u32,
    end: u32,
}

impl Window {
    fn length(&self) -> u32 {
        self.end - self.start
    }
}

fn half_hour_clock(value: &str) -> Result<u32, GeneratorError> {
    parse_clock(value)
        .filter(|minutes| minutes % SLOT_MINUTES == 0)
        .ok_or_else(|| GeneratorError::InvalidClock(value.to_string()))
}

fn validate(
    start_date: NaiveDate,
    end_date: NaiveDate,
    settings: &GeneratorSettings,
) -> Result<Window, GeneratorError> {
    if start_date > end_date {
        return Err(GeneratorError::InvertedRange {
            start: start_date,
            end: end_date,
        });
    }
    if !is_bounded_range(start_date, end_date) {
        return Err(GeneratorError::RangeTooLong {
            start: start_date,
            end: end_date,
        });
    }

    let (min, max) = (
        settings.min_hours_per_employee,
        settings.max_hours_per_employee,
    );
    if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
        return Err(GeneratorError::NegativeHours);
    }
    if min > max {
        return Err(GeneratorError::MinAboveMax { min, max });
    }

    let start = half_hour_clock(&settings.start_hour)?;
    let end = half_hour_clock(&settings.end_hour)?;
    if start >= end {
        return Err(GeneratorError::EmptyWindow {
            start: settings.start_hour.clone(),
            end: settings.end_hour.clone(),
        });
    }

    Ok(Window { start, end })
}

/// Budget in minutes, rounded down to whole slots so shifts stay on the grid.
fn budget_minutes(available_days: usize, settings: &GeneratorSettings) -> u32 {
    let max = settings.max_hours_per_employee;
    let hours = if settings.distribute_evenly {
        (available_days as f64 * 8.0).clamp(settings.min_hours_per_employee, max)
    } else {
        max
    };
    let minutes = (hours * 60.0) as u32;
    minutes - minutes % SLOT_MINUTES
}

fn shift_length(remaining: u32) -> u32 {
    if remaining >= FULL_SHIFT_MINUTES {
        FULL_SHIFT_MINUTES
    } else {
        remaining.min(HALF_SHIFT_MINUTES)
    }
}

/// Days each user is blocked by approved time off inside the range.
fn blocked_days(days: &[NaiveDate], time_off: &[TimeOffRequest]) -> HashMap<i64, HashSet<NaiveDate>> {
    let mut blocked: HashMap<i64, HashSet<NaiveDate>> = HashMap::new();
    for request in time_off.iter().filter(|r| r.is_approved()) {
        // Half-day requests block the whole day here, unlike the grid.
        let covered = days.iter().copied().filter(|day| request.covers(*day));
        blocked.entry(request.user_id).or_default().extend(covered);
    }
    blocked
}

/// Emits shifts for `users` over `[start_date, end_date]`.
///
/// Callers pass the candidate users already filtered to active employees.
pub fn generate(
    start_date: NaiveDate,
    end_date: NaiveDate,
    users: &[User],
    settings: &GeneratorSettings,
    approved_time_off: &[TimeOffRequest],
) -> Result<Vec<GeneratedShift>, GeneratorError> {
    let window = validate(start_date, end_date, settings)?;
    let days = days_between(start_date, end_date);

    let blocked = if settings.respect_time_off_requests {
        blocked_days(&days, approved_time_off)
    } else {
        HashMap::new()
    };
    let is_blocked = |user_id: i64, day: NaiveDate| {
        blocked
            .get(&user_id)
            .is_some_and(|user_days| user_days.contains(&day))
    };

    let mut remaining: Vec<u32> = users
        .iter()
        .map(|user| {
            let available = days.iter().filter(|day| !is_blocked(user.id, **day)).count();
            budget_minutes(available, settings)
        })
        .collect();

    let mut shifts = Vec::new();
    for day in &days {
        for (user, budget) in users.iter().zip(remaining.iter_mut()) {
            if *budget == 0 || is_blocked(user.id, *day) {
                continue;
            }

            let length = shift_length(*budget);
            if length > window.length() {
                log::debug!(
                    "Skipping user {} on {}: {} minute shift does not fit the window",
                    user.id,
                    day,
                    length
                );
                continue;
            }

            *budget -= length;
            shifts.push(GeneratedShift {
                user_id: user.id,
                date: *day,
                day: DayOfWeek::from_date(*day),
                start_time: format_clock(window.start),
                end_time: format_clock(window.start + length),
                shift_type: ShiftType::Regular,
            });
        }
    }

    Ok(shifts)
}

/// Total generated hours per user.
pub fn hours_by_user(shifts: &[GeneratedShift]) -> HashMap<i64, f64> {
    let mut totals = HashMap::new();
    for shift in shifts {
        *totals.entry(shift.user_id).or_insert(0.0) += shift.minutes() as f64 / 60.0;
    }
    totals
}
