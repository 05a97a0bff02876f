//! Clock strings, half-hour grid slots and date ranges.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// First slot of the grid starts at 04:00.
pub const GRID_START_MINUTES: u32 = 4 * 60;
/// The grid closes at midnight.
pub const GRID_END_MINUTES: u32 = 24 * 60;
pub const SLOT_MINUTES: u32 = 30;
pub const SLOTS_PER_DAY: usize = ((GRID_END_MINUTES - GRID_START_MINUTES) / SLOT_MINUTES) as usize;
/// Longest date range a schedule, a generator run or a range lookup may span.
pub const MAX_RANGE_DAYS: i64 = 366;

static CLOCK: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-4]):([0-5]\d)$"));

/// Parses `HH:MM` into minutes after midnight. `24:00` is accepted as end of day.
pub fn parse_clock(value: &str) -> Option<u32> {
    let re = CLOCK.as_ref().ok()?;
    let caps = re.captures(value.trim())?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    let total = hours * 60 + minutes;
    (total <= GRID_END_MINUTES).then_some(total)
}

pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn slot_start_minutes(slot: usize) -> u32 {
    GRID_START_MINUTES + slot as u32 * SLOT_MINUTES
}

/// Start label of a slot, e.g. `04:30` for slot 1.
pub fn slot_label(slot: usize) -> String {
    format_clock(slot_start_minutes(slot))
}

/// Labels for every slot of a grid day.
pub fn slot_labels() -> Vec<String> {
    (0..SLOTS_PER_DAY).map(slot_label).collect()
}

/// Slots covered by `[start, end)`, clipped to the grid window.
///
/// Unparseable or inverted ranges cover nothing.
pub fn slot_range(start: &str, end: &str) -> Range<usize> {
    let (Some(start), Some(end)) = (parse_clock(start), parse_clock(end)) else {
        return 0..0;
    };
    let start = start.clamp(GRID_START_MINUTES, GRID_END_MINUTES);
    let end = end.clamp(GRID_START_MINUTES, GRID_END_MINUTES);
    if start >= end {
        return 0..0;
    }
    let first = ((start - GRID_START_MINUTES) / SLOT_MINUTES) as usize;
    let last = (end - GRID_START_MINUTES).div_ceil(SLOT_MINUTES) as usize;
    first..last.min(SLOTS_PER_DAY)
}

/// Clock strings bounding a run of slots.
pub fn slot_span(slots: Range<usize>) -> (String, String) {
    (slot_label(slots.start), format_clock(slot_start_minutes(slots.end)))
}

/// Every calendar day in `[start, end]`; empty when `start > end`.
///
/// Stops at the last representable date instead of overflowing.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Inclusive length of `[start, end]` in days.
pub fn range_days(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days() + 1
}

/// Whether `[start, end]` is ordered and no longer than [`MAX_RANGE_DAYS`].
pub fn is_bounded_range(start: NaiveDate, end: NaiveDate) -> bool {
    start <= end && range_days(start, end) <= MAX_RANGE_DAYS
}
