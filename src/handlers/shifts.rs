use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::database::models::{NotificationType, Schedule, Shift, ShiftInput, ShiftPatch};
use crate::database::repositories::{ScheduleRepository, ShiftRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::notifier::NotificationService;
use crate::services::schedule_time::parse_clock;

pub const SHIFT_UPDATED_MESSAGE: &str = "Your work schedule has been updated";

fn validate_times(start_time: &str, end_time: &str) -> Result<(), AppError> {
    match (parse_clock(start_time), parse_clock(end_time)) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(AppError::BadRequest(
            "Shift must end after it starts".to_string(),
        )),
        _ => Err(AppError::BadRequest(
            "Shift times must be formatted as HH:MM".to_string(),
        )),
    }
}

/// Tells the shift owner about a change once the schedule is public.
///
/// Failures are logged; the shift change itself already succeeded.
pub(crate) async fn notify_shift_change(
    notifier: &NotificationService,
    schedule: &Schedule,
    shift: &Shift,
) {
    if !schedule.is_published {
        return;
    }

    let result = notifier
        .notify(
            shift.user_id,
            NotificationType::ShiftUpdate,
            SHIFT_UPDATED_MESSAGE,
            json!({
                "shiftId": shift.id,
                "scheduleId": shift.schedule_id,
                "day": shift.day,
            }),
        )
        .await;
    if let Err(e) = result {
        log::error!("Failed to notify user {} of shift {}: {}", shift.user_id, shift.id, e);
    }
}

pub async fn create_shift(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    users: web::Data<dyn UserRepository>,
    notifier: web::Data<NotificationService>,
    input: web::Json<ShiftInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let input = input.into_inner();

    validate_times(&input.start_time, &input.end_time)?;
    let schedule = schedules
        .find_by_id(input.schedule_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;
    if users.find_by_id(input.user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let shift = shifts.create(input).await?;
    notify_shift_change(&notifier, &schedule, &shift).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(shift)))
}

pub async fn update_shift(
    claims: Claims,
    schedules: web::Data<dyn ScheduleRepository>,
    shifts: web::Data<dyn ShiftRepository>,
    notifier: web::Data<NotificationService>,
    path: web::Path<i64>,
    input: web::Json<ShiftPatch>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let shift_id = path.into_inner();
    let patch = input.into_inner();

    let existing = shifts
        .find_by_id(shift_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;
    validate_times(
        patch.start_time.as_deref().unwrap_or(&existing.start_time),
        patch.end_time.as_deref().unwrap_or(&existing.end_time),
    )?;

    let shift = shifts
        .update(shift_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    if let Some(schedule) = schedules.find_by_id(shift.schedule_id).await? {
        notify_shift_change(&notifier, &schedule, &shift).await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(shift)))
}

pub async fn delete_shift(
    claims: Claims,
    shifts: web::Data<dyn ShiftRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;

    if !shifts.delete(path.into_inner()).await? {
        return Err(AppError::NotFound("Shift not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Shift deleted",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_times() {
        assert!(validate_times("08:00", "16:00").is_ok());
        assert!(validate_times("16:00", "08:00").is_err());
        assert!(validate_times("8am", "16:00").is_err());
    }
}
