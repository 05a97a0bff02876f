use serde::Serialize;

use crate::database::{
    models::{NotificationType, Schedule},
    repositories::{ScheduleRepository, UserRepository},
};
use crate::error::AppError;
use crate::services::notifier::NotificationService;

pub const SCHEDULE_PUBLISHED_MESSAGE: &str = "A new work schedule has been published";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub schedule: Schedule,
    pub notified_users: usize,
    pub failed_users: Vec<i64>,
}

/// Marks the schedule published, then notifies every active user.
///
/// The flag is flipped before the fan-out and is not rolled back when some
/// notifications fail; those users are reported in `failed_users`.
/// Publishing again repeats the fan-out.
pub async fn publish_schedule(
    schedules: &dyn ScheduleRepository,
    users: &dyn UserRepository,
    notifier: &NotificationService,
    schedule_id: i64,
) -> Result<PublishOutcome, AppError> {
    let schedule = schedules
        .mark_published(schedule_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let recipients: Vec<i64> = users
        .list()
        .await?
        .into_iter()
        .filter(|u| u.is_active)
        .map(|u| u.id)
        .collect();

    let report = notifier
        .notify_all(
            &recipients,
            NotificationType::ScheduleUpdate,
            SCHEDULE_PUBLISHED_MESSAGE,
            serde_json::json!({
                "scheduleId": schedule.id,
                "startDate": schedule.start_date,
                "endDate": schedule.end_date,
            }),
        )
        .await;

    log::info!(
        "Schedule {} published: {} notified, {} failed",
        schedule.id,
        report.notified.len(),
        report.failed.len()
    );

    Ok(PublishOutcome {
        schedule,
        notified_users: report.notified.len(),
        failed_users: report.failed,
    })
}
