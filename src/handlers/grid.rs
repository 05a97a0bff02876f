use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::models::{DayOfWeek, Schedule, Shift, ShiftPatch};
use crate::database::repositories::{
    ScheduleRepository, ShiftRepository, TimeOffRepository, UserRepository,
};
use crate::error::AppError;
use crate::handlers::schedules::{find_schedule, schedulable_employees};
use crate::handlers::shared::ApiResponse;
use crate::handlers::shifts::notify_shift_change;
use crate::services::auth::Claims;
use crate::services::grid::{self, CellAction, GridError, GridRow, ScheduleGrid};
use crate::services::notifier::NotificationService;
use crate::services::schedule_time::days_between;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellClickRequest {
    pub user_id: i64,
    pub date: NaiveDate,
    pub slot: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowNotesRequest {
    pub user_id: i64,
    pub date: NaiveDate,
    pub notes: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyDayRequest {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellClickResponse {
    pub action: &'static str,
    pub row: GridRow,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyDayResponse {
    pub created: Vec<Shift>,
}

/// Repositories the grid is read from.
struct GridSources<'a> {
    users: &'a dyn UserRepository,
    shifts: &'a dyn ShiftRepository,
    time_off: &'a dyn TimeOffRepository,
}

impl GridSources<'_> {
    async fn project(&self, schedule: &Schedule) -> Result<ScheduleGrid, AppError> {
        let employees = schedulable_employees(self.users).await?;
        let shifts = self.shifts.list_by_schedule(schedule.id).await?;
        let time_off = self
            .time_off
            .list_approved_between(schedule.start_date, schedule.end_date)
            .await?;
        let dates = days_between(schedule.start_date, schedule.end_date);

        Ok(grid::project(
            schedule.id,
            &dates,
            &employees,
            &shifts,
            &time_off,
        ))
    }

    async fn row(
        &self,
        schedule: &Schedule,
        date: NaiveDate,
        user_id: i64,
    ) -> Result<GridRow, AppError> {
        let grid = self.project(schedule).await?;
        grid.row(date, user_id)
            .cloned()
            .ok_or_else(|| GridError::UnknownEmployee(user_id).into())
    }
}

async fn update_existing(
    shifts: &dyn ShiftRepository,
    shift_id: i64,
    patch: ShiftPatch,
) -> Result<Shift, AppError> {
    shifts
        .update(shift_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))
}

fn ensure_in_schedule(schedule: &Schedule, date: NaiveDate) -> Result<(), GridError> {
    if schedule.contains(date) {
        Ok(())
    } else {
        Err(GridError::DateOutOfRange(date))
    }
}

pub async fn get_grid(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    users: web::Data<dyn UserRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    time_off: web::Data<dyn TimeOffRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let schedule = find_schedule(&**schedules, path.into_inner()).await?;

    let sources = GridSources {
        users: &**users,
        shifts: &**shifts,
        time_off: &**time_off,
    };

    let grid = sources.project(&schedule).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(grid)))
}

/// Advances one cell through the click cycle and returns the re-projected row.
#[allow(clippy::too_many_arguments)]
pub async fn click_cell(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    users: web::Data<dyn UserRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    time_off: web::Data<dyn TimeOffRepository>,
    notifier: web::Data<NotificationService>,
    path: web::Path<i64>,
    input: web::Json<CellClickRequest>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let schedule = find_schedule(&**schedules, path.into_inner()).await?;
    ensure_in_schedule(&schedule, input.date)?;

    let sources = GridSources {
        users: &**users,
        shifts: &**shifts,
        time_off: &**time_off,
    };
    let row = sources.row(&schedule, input.date, input.user_id).await?;
    let day = DayOfWeek::from_date(input.date);

    let existing = shifts
        .list_by_schedule_and_user(schedule.id, input.user_id)
        .await?;
    let actions = grid::plan_click(schedule.id, day, &row, &existing, input.slot)?;

    let mut touched = None;
    for action in actions {
        match action {
            CellAction::Create(shift_input) => {
                touched = Some(shifts.create(shift_input).await?);
            }
            CellAction::Update {
                shift_id,
                shift_type,
            } => {
                touched = Some(
                    update_existing(&**shifts, shift_id, ShiftPatch::shift_type(shift_type))
                        .await?,
                );
            }
            CellAction::Resize {
                shift_id,
                start_time,
                end_time,
            } => {
                touched = Some(
                    update_existing(&**shifts, shift_id, ShiftPatch::times(start_time, end_time))
                        .await?,
                );
            }
            CellAction::Delete { shift_id } => {
                shifts.delete(shift_id).await?;
            }
        }
    }
    if let Some(shift) = &touched {
        notify_shift_change(&notifier, &schedule, shift).await;
    }

    let before = row.cells.get(input.slot).and_then(|cell| cell.cell_type);
    let row = sources.row(&schedule, input.date, input.user_id).await?;
    let after = row.cells.get(input.slot).and_then(|cell| cell.cell_type);
    let action = grid::click_outcome(before, after);

    Ok(HttpResponse::Ok().json(ApiResponse::success(CellClickResponse { action, row })))
}

/// Writes the row notes onto every shift of that user and weekday.
pub async fn update_row_notes(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    users: web::Data<dyn UserRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    time_off: web::Data<dyn TimeOffRepository>,
    path: web::Path<i64>,
    input: web::Json<RowNotesRequest>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let schedule = find_schedule(&**schedules, path.into_inner()).await?;
    ensure_in_schedule(&schedule, input.date)?;
    let input = input.into_inner();

    let existing = shifts
        .list_by_schedule_and_user(schedule.id, input.user_id)
        .await?;
    let targets = grid::note_targets(&existing, input.user_id, DayOfWeek::from_date(input.date))?;
    for shift_id in targets {
        shifts
            .update(shift_id, ShiftPatch::notes(Some(input.notes.clone())))
            .await?;
    }

    let sources = GridSources {
        users: &**users,
        shifts: &**shifts,
        time_off: &**time_off,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        sources.row(&schedule, input.date, input.user_id).await?,
    )))
}

/// Recreates one day's shifts on another day of the same schedule.
pub async fn copy_day(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    users: web::Data<dyn UserRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    time_off: web::Data<dyn TimeOffRepository>,
    path: web::Path<i64>,
    input: web::Json<CopyDayRequest>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let schedule = find_schedule(&**schedules, path.into_inner()).await?;
    ensure_in_schedule(&schedule, input.from_date)?;
    ensure_in_schedule(&schedule, input.to_date)?;

    let sources = GridSources {
        users: &**users,
        shifts: &**shifts,
        time_off: &**time_off,
    };
    let projected = sources.project(&schedule).await?;
    let source = projected
        .day(input.from_date)
        .ok_or(GridError::DateOutOfRange(input.from_date))?;

    let inputs = grid::plan_copy_day(schedule.id, source, DayOfWeek::from_date(input.to_date))?;
    let created = shifts.create_many(inputs).await?;
    log::info!(
        "Copied {} to {} in schedule {}: {} shifts",
        input.from_date,
        input.to_date,
        schedule.id,
        created.len()
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(CopyDayResponse { created })))
}
