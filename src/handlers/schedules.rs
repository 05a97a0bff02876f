use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::database::models::{Schedule, ScheduleInput, Shift, User};
use crate::database::repositories::{
    ScheduleRepository, ShiftRepository, TimeOffRepository, UserRepository,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::generator::{self, GeneratedShift, GeneratorSettings};
use crate::services::notifier::NotificationService;
use crate::services::publisher;
use crate::services::schedule_time::{MAX_RANGE_DAYS, is_bounded_range};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub settings: GeneratorSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub shifts: Vec<GeneratedShift>,
    pub hours_by_user: HashMap<i64, f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub schedule: Schedule,
    pub shifts: Vec<Shift>,
}

pub(crate) async fn find_schedule(
    schedules: &dyn ScheduleRepository,
    id: i64,
) -> Result<Schedule, AppError> {
    schedules
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))
}

fn range_too_long() -> AppError {
    AppError::BadRequest(format!(
        "Date range must not span more than {} days",
        MAX_RANGE_DAYS
    ))
}

/// Active employees, in id order.
pub(crate) async fn schedulable_employees(
    users: &dyn UserRepository,
) -> Result<Vec<User>, AppError> {
    Ok(users
        .list()
        .await?
        .into_iter()
        .filter(User::is_schedulable)
        .collect())
}

/// The schedule overlapping the requested week, or null.
pub async fn get_schedule_by_range(
    _claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    query: web::Query<ScheduleRangeQuery>,
) -> Result<HttpResponse, AppError> {
    let start = query.start_date;
    let end = match query.end_date {
        Some(end) => end,
        None => start
            .checked_add_days(Days::new(7))
            .ok_or_else(|| AppError::BadRequest(format!("Start date {} is out of range", start)))?,
    };
    if end >= start && !is_bounded_range(start, end) {
        return Err(range_too_long());
    }

    let schedule = schedules.find_overlapping(start, end).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(schedule)))
}

pub async fn create_schedule(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    input: web::Json<ScheduleInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let input = input.into_inner();

    if input.start_date > input.end_date {
        return Err(AppError::BadRequest(
            "Start date must not be after end date".to_string(),
        ));
    }
    if !is_bounded_range(input.start_date, input.end_date) {
        return Err(range_too_long());
    }

    let schedule = schedules.create(input, claims.user_id()).await?;
    log::info!(
        "Schedule {} created for {} - {}",
        schedule.id,
        schedule.start_date,
        schedule.end_date
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(schedule)))
}

pub async fn get_schedule(
    _claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let schedule = find_schedule(&**schedules, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(schedule)))
}

pub async fn publish_schedule(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    users: web::Data<dyn UserRepository>,
    notifier: web::Data<NotificationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;

    let outcome =
        publisher::publish_schedule(&**schedules, &**users, &notifier, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

/// Admins see every shift; employees only their own.
pub async fn get_schedule_shifts(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let schedule = find_schedule(&**schedules, path.into_inner()).await?;

    let items = if claims.is_admin() {
        shifts.list_by_schedule(schedule.id).await?
    } else {
        shifts
            .list_by_schedule_and_user(schedule.id, claims.user_id())
            .await?
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

async fn run_generator(
    users: &dyn UserRepository,
    time_off: &dyn TimeOffRepository,
    request: &GenerateRequest,
) -> Result<Vec<GeneratedShift>, AppError> {
    let employees = schedulable_employees(users).await?;
    let approved = time_off
        .list_approved_between(request.start_date, request.end_date)
        .await?;

    Ok(generator::generate(
        request.start_date,
        request.end_date,
        &employees,
        &request.settings,
        &approved,
    )?)
}

/// Runs the generator without storing anything.
pub async fn preview_schedule(
    claims: Claims,
    users: web::Data<dyn UserRepository>,
    time_off: web::Data<dyn TimeOffRepository>,
    input: web::Json<GenerateRequest>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;

    let shifts = run_generator(&**users, &**time_off, &input).await?;
    let hours_by_user = generator::hours_by_user(&shifts);

    Ok(HttpResponse::Ok().json(ApiResponse::success(PreviewResponse {
        shifts,
        hours_by_user,
    })))
}

/// Generates and stores shifts, reusing the schedule that overlaps the
/// range or creating a draft for it.
pub async fn auto_generate_schedule(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    users: web::Data<dyn UserRepository>,
    time_off: web::Data<dyn TimeOffRepository>,
    input: web::Json<GenerateRequest>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let input = input.into_inner();

    let generated = run_generator(&**users, &**time_off, &input).await?;

    let schedule = match schedules
        .find_overlapping(input.start_date, input.end_date)
        .await?
    {
        Some(schedule) => schedule,
        None => {
            schedules
                .create(
                    ScheduleInput {
                        start_date: input.start_date,
                        end_date: input.end_date,
                    },
                    claims.user_id(),
                )
                .await?
        }
    };

    let inputs = generated
        .into_iter()
        .map(|shift| shift.into_input(schedule.id))
        .collect();
    let created = shifts.create_many(inputs).await?;
    log::info!(
        "Generated {} shifts for schedule {}",
        created.len(),
        schedule.id
    );

    Ok(HttpResponse::Created().json(ApiResponse::success(GenerateResponse {
        schedule,
        shifts: created,
    })))
}
