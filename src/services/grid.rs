//! Per-day, per-employee, per-half-hour projection of a schedule.
//!
//! The grid is never stored. It is rebuilt from shifts and approved time off
//! on every read, and edits go back to the shift store as single
//! create/update/delete actions planned here.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::database::models::{
    DayOfWeek, Shift, ShiftInput, ShiftType, TimeOffDuration, TimeOffRequest, TimeOffType, User,
};
use crate::error::AppError;
use crate::services::schedule_time::{SLOTS_PER_DAY, slot_labels, slot_range, slot_span};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    #[serde(rename = "type")]
    pub cell_type: Option<ShiftType>,
    pub shift_id: Option<i64>,
    pub is_time_off: bool,
}

impl GridCell {
    pub fn is_empty(&self) -> bool {
        self.cell_type.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub user_id: i64,
    pub cells: Vec<GridCell>,
    pub notes: String,
    /// Worked hours, 0.5 per working slot.
    pub total: f64,
}

impl GridRow {
    fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            cells: vec![GridCell::default(); SLOTS_PER_DAY],
            notes: String::new(),
            total: 0.0,
        }
    }

    fn recompute_total(&mut self) {
        let working = self
            .cells
            .iter()
            .filter(|cell| cell.cell_type.is_some_and(|t| t.is_working()))
            .count();
        self.total = working as f64 * 0.5;
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridDay {
    pub date: NaiveDate,
    pub day: DayOfWeek,
    pub rows: BTreeMap<i64, GridRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGrid {
    pub schedule_id: i64,
    pub slots: Vec<String>,
    pub days: Vec<GridDay>,
}

impl ScheduleGrid {
    pub fn day(&self, date: NaiveDate) -> Option<&GridDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn row(&self, date: NaiveDate, user_id: i64) -> Option<&GridRow> {
        self.day(date).and_then(|d| d.rows.get(&user_id))
    }
}

fn time_off_cell_type(request_type: TimeOffType) -> ShiftType {
    match request_type {
        TimeOffType::Vacation => ShiftType::Vacation,
        TimeOffType::Personal | TimeOffType::Sick => ShiftType::Leave,
    }
}

fn time_off_note(request: &TimeOffRequest) -> String {
    let label = match request.request_type {
        TimeOffType::Vacation => "Vacation",
        TimeOffType::Personal | TimeOffType::Sick => "Leave",
    };
    match request.duration {
        TimeOffDuration::FullDay => format!("{label} approved"),
        TimeOffDuration::Morning => format!("{label} morning"),
        TimeOffDuration::Afternoon => format!("{label} afternoon"),
    }
}

fn time_off_slots(duration: TimeOffDuration) -> Range<usize> {
    let half = SLOTS_PER_DAY / 2;
    match duration {
        TimeOffDuration::FullDay => 0..SLOTS_PER_DAY,
        TimeOffDuration::Morning => 0..half,
        TimeOffDuration::Afternoon => half..SLOTS_PER_DAY,
    }
}

/// Builds the grid for `dates`.
///
/// Rows exist only for `employees`; shifts and time off of anyone else are
/// ignored. Shifts are matched to dates by weekday. Approved time off is laid
/// over shifts and wins.
pub fn project(
    schedule_id: i64,
    dates: &[NaiveDate],
    employees: &[User],
    shifts: &[Shift],
    time_off: &[TimeOffRequest],
) -> ScheduleGrid {
    let days = dates
        .iter()
        .map(|&date| {
            let day = DayOfWeek::from_date(date);
            let mut rows: BTreeMap<i64, GridRow> = employees
                .iter()
                .map(|user| (user.id, GridRow::empty(user.id)))
                .collect();

            for shift in shifts.iter().filter(|s| s.day == day) {
                let Some(row) = rows.get_mut(&shift.user_id) else {
                    continue;
                };
                for cell in &mut row.cells[slot_range(&shift.start_time, &shift.end_time)] {
                    *cell = GridCell {
                        cell_type: Some(shift.shift_type),
                        shift_id: Some(shift.id),
                        is_time_off: false,
                    };
                }
                if let Some(notes) = shift.notes.as_deref().filter(|n| !n.is_empty()) {
                    row.notes = notes.to_string();
                }
            }

            for request in time_off
                .iter()
                .filter(|r| r.is_approved() && r.covers(date))
            {
                let Some(row) = rows.get_mut(&request.user_id) else {
                    continue;
                };
                let cell_type = time_off_cell_type(request.request_type);
                for cell in &mut row.cells[time_off_slots(request.duration)] {
                    *cell = GridCell {
                        cell_type: Some(cell_type),
                        shift_id: None,
                        is_time_off: true,
                    };
                }
                row.notes = time_off_note(request);
            }

            for row in rows.values_mut() {
                row.recompute_total();
            }

            GridDay { date, day, rows }
        })
        .collect();

    ScheduleGrid {
        schedule_id,
        slots: slot_labels(),
        days,
    }
}

/// Types that open the cycle: `work`, `regular`, `sick` and `note`.
fn is_base_type(shift_type: ShiftType) -> bool {
    !matches!(shift_type, ShiftType::Vacation | ShiftType::Leave)
}

/// The click cycle: empty → base → vacation → leave → empty.
///
/// `base` is the type an empty cell turns into, normally `work`.
pub fn next_cell_type(current: Option<ShiftType>, base: ShiftType) -> Option<ShiftType> {
    match current {
        None => Some(base),
        Some(ShiftType::Vacation) => Some(ShiftType::Leave),
        Some(ShiftType::Leave) => None,
        Some(_) => Some(ShiftType::Vacation),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Slot {0} is outside the grid")]
    SlotOutOfRange(usize),

    #[error("Date {0} is outside the schedule")]
    DateOutOfRange(NaiveDate),

    #[error("User {0} has no row in this schedule")]
    UnknownEmployee(i64),

    #[error("Approved time off cannot be edited from the schedule grid")]
    TimeOffCell,

    #[error("Cannot copy {0} onto itself")]
    SameDay(DayOfWeek),

    #[error("Notes are stored on shifts; add a shift for that day first")]
    NoShiftsForNotes,
}

impl From<GridError> for AppError {
    fn from(error: GridError) -> Self {
        match error {
            GridError::UnknownEmployee(_) => AppError::NotFound(error.to_string()),
            _ => AppError::BadRequest(error.to_string()),
        }
    }
}

/// One mutation against the shift store.
#[derive(Debug, Clone, PartialEq)]
pub enum CellAction {
    Create(ShiftInput),
    Update {
        shift_id: i64,
        shift_type: ShiftType,
    },
    Resize {
        shift_id: i64,
        start_time: String,
        end_time: String,
    },
    Delete {
        shift_id: i64,
    },
}

impl CellAction {
    fn resize(shift_id: i64, slots: Range<usize>) -> Self {
        let (start_time, end_time) = slot_span(slots);
        CellAction::Resize {
            shift_id,
            start_time,
            end_time,
        }
    }
}

/// What a click did to the clicked cell.
pub fn click_outcome(before: Option<ShiftType>, after: Option<ShiftType>) -> &'static str {
    match (before, after) {
        (None, _) => "created",
        (_, None) => "deleted",
        _ => "updated",
    }
}

/// The editable shift shown in `slot`.
fn shift_at(row: &GridRow, slot: usize) -> Option<(i64, ShiftType)> {
    let cell = row.cells.get(slot).filter(|cell| !cell.is_time_off)?;
    Some((cell.shift_id?, cell.cell_type?))
}

/// Slots covered by a shift, from its stored times or else from the row.
fn shift_slots(row: &GridRow, shifts: &[Shift], shift_id: i64) -> Range<usize> {
    let stored = shifts
        .iter()
        .find(|s| s.id == shift_id)
        .map(|s| slot_range(&s.start_time, &s.end_time))
        .filter(|slots| !slots.is_empty());
    if let Some(slots) = stored {
        return slots;
    }

    let shown = |cell: &GridCell| cell.shift_id == Some(shift_id);
    let first = row.cells.iter().position(shown).unwrap_or(0);
    let last = row.cells.iter().rposition(shown).map_or(first, |i| i + 1);
    first..last
}

/// Plans the store mutations for clicking `slot` in `row`.
///
/// Only the clicked slot changes. A longer shift gives the slot up and keeps
/// the rest, split in two when the slot sat in its middle. A slot that ends
/// up with the same type as a neighbouring shift joins it, so an empty cell
/// next to a shift takes that shift's type when it opens the cycle. Four
/// clicks therefore restore any slot of a shift longer than one slot.
pub fn plan_click(
    schedule_id: i64,
    day: DayOfWeek,
    row: &GridRow,
    shifts: &[Shift],
    slot: usize,
) -> Result<Vec<CellAction>, GridError> {
    let cell = row.cells.get(slot).ok_or(GridError::SlotOutOfRange(slot))?;
    if cell.is_time_off {
        return Err(GridError::TimeOffCell);
    }

    let left = slot.checked_sub(1).and_then(|i| shift_at(row, i));
    let right = shift_at(row, slot + 1);
    let base = [left, right]
        .into_iter()
        .flatten()
        .map(|(_, shift_type)| shift_type)
        .find(|shift_type| is_base_type(*shift_type))
        .unwrap_or(ShiftType::Work);
    let next = next_cell_type(cell.cell_type, base);

    let current = cell
        .shift_id
        .and_then(|id| shifts.iter().find(|s| s.id == id));
    let notes = match current {
        Some(shift) => shift.notes.clone(),
        None => (!row.notes.is_empty()).then(|| row.notes.clone()),
    };
    let area = current.and_then(|shift| shift.area.clone());
    let piece = |slots: Range<usize>, shift_type: ShiftType| {
        let (start_time, end_time) = slot_span(slots);
        ShiftInput {
            schedule_id,
            user_id: row.user_id,
            day,
            start_time,
            end_time,
            shift_type,
            notes: notes.clone(),
            area: area.clone(),
        }
    };

    let mut actions = Vec::new();

    // The shift that covers the clicked slot and nothing else
    let mut own = None;
    if let (Some(shift_id), Some(shift_type)) = (cell.shift_id, cell.cell_type) {
        let span = shift_slots(row, shifts, shift_id);
        if span.len() <= 1 || !span.contains(&slot) {
            own = Some(shift_id);
        } else {
            let before = span.start..slot;
            let after = slot + 1..span.end;
            if before.is_empty() {
                actions.push(CellAction::resize(shift_id, after));
            } else {
                actions.push(CellAction::resize(shift_id, before));
                if !after.is_empty() {
                    actions.push(CellAction::Create(piece(after, shift_type)));
                }
            }
        }
    }

    let Some(next) = next else {
        actions.extend(own.map(|shift_id| CellAction::Delete { shift_id }));
        return Ok(actions);
    };

    let join_left = left
        .filter(|&(id, shift_type)| shift_type == next && Some(id) != cell.shift_id)
        .map(|(id, _)| id);
    let join_right = right
        .filter(|&(id, shift_type)| {
            shift_type == next && Some(id) != cell.shift_id && Some(id) != join_left
        })
        .map(|(id, _)| id);

    let kept = match (join_left, join_right) {
        (Some(left_id), right_id) => {
            let mut span = shift_slots(row, shifts, left_id);
            span.start = span.start.min(slot);
            span.end = span.end.max(slot + 1);
            if let Some(right_id) = right_id {
                span.end = span.end.max(shift_slots(row, shifts, right_id).end);
            }
            actions.push(CellAction::resize(left_id, span));
            actions.extend(right_id.map(|shift_id| CellAction::Delete { shift_id }));
            Some(left_id)
        }
        (None, Some(right_id)) => {
            let mut span = shift_slots(row, shifts, right_id);
            span.start = span.start.min(slot);
            span.end = span.end.max(slot + 1);
            actions.push(CellAction::resize(right_id, span));
            Some(right_id)
        }
        (None, None) => None,
    };

    match (kept, own) {
        (Some(_), Some(shift_id)) => actions.push(CellAction::Delete { shift_id }),
        (Some(_), None) => {}
        (None, Some(shift_id)) => actions.push(CellAction::Update {
            shift_id,
            shift_type: next,
        }),
        (None, None) => actions.push(CellAction::Create(piece(slot..slot + 1, next))),
    }

    Ok(actions)
}

/// Contiguous runs of same-type, non-time-off cells in a row.
fn runs(row: &GridRow) -> Vec<(Range<usize>, ShiftType)> {
    let mut runs = Vec::new();
    let mut current: Option<(usize, ShiftType)> = None;

    for (index, cell) in row.cells.iter().enumerate() {
        let cell_type = cell.cell_type.filter(|_| !cell.is_time_off);
        match (current, cell_type) {
            (Some((_, open)), Some(t)) if open == t => {}
            (open, next) => {
                if let Some((start, t)) = open {
                    runs.push((start..index, t));
                }
                current = next.map(|t| (index, t));
            }
        }
    }
    if let Some((start, t)) = current {
        runs.push((start..row.cells.len(), t));
    }
    runs
}

/// New shifts reproducing `source` on `target`. Existing target shifts are
/// left in place; approved time off on the source day is not copied.
pub fn plan_copy_day(
    schedule_id: i64,
    source: &GridDay,
    target: DayOfWeek,
) -> Result<Vec<ShiftInput>, GridError> {
    if source.day == target {
        return Err(GridError::SameDay(target));
    }

    let mut inputs = Vec::new();
    for row in source.rows.values() {
        let notes = (!row.notes.is_empty()).then(|| row.notes.clone());
        for (slots, shift_type) in runs(row) {
            let (start_time, end_time) = slot_span(slots);
            inputs.push(ShiftInput {
                schedule_id,
                user_id: row.user_id,
                day: target,
                start_time,
                end_time,
                shift_type,
                notes: notes.clone(),
                area: None,
            });
        }
    }
    Ok(inputs)
}

/// Ids of the shifts a row's notes are written to.
pub fn note_targets(shifts: &[Shift], user_id: i64, day: DayOfWeek) -> Result<Vec<i64>, GridError> {
    let ids: Vec<i64> = shifts
        .iter()
        .filter(|s| s.user_id == user_id && s.day == day)
        .map(|s| s.id)
        .collect();
    if ids.is_empty() {
        return Err(GridError::NoShiftsForNotes);
    }
    Ok(ids)
}
