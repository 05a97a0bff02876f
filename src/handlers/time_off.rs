use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::{
    NewTimeOffRequest, NotificationType, TimeOffRequestInput, TimeOffStatus, UserRole,
};
use crate::database::repositories::{TimeOffRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::{AuthService, Claims};
use crate::services::notifier::NotificationService;

#[derive(Debug, Deserialize)]
pub struct TimeOffQuery {
    /// `pending` (admin default), `approved`, `rejected` or `all`.
    pub status: Option<String>,
}

/// Admins see pending requests unless another status is asked for;
/// employees see all of their own.
pub async fn list_requests(
    claims: Claims,
    time_off: web::Data<dyn TimeOffRepository>,
    query: web::Query<TimeOffQuery>,
) -> Result<HttpResponse, AppError> {
    let status_filter = match query.status.as_deref() {
        Some("all") => None,
        Some(status) => Some(
            status
                .parse::<TimeOffStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None if claims.is_admin() => Some(TimeOffStatus::Pending),
        None => None,
    };
    let owner = (!claims.is_admin()).then(|| claims.user_id());

    let requests: Vec<_> = time_off
        .list(owner)
        .await?
        .into_iter()
        .filter(|r| status_filter.is_none_or(|s| r.status == s))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Files a request for the caller and alerts every active admin.
pub async fn create_request(
    claims: Claims,
    auth_service: web::Data<AuthService>,
    time_off: web::Data<dyn TimeOffRepository>,
    users: web::Data<dyn UserRepository>,
    notifier: web::Data<NotificationService>,
    input: web::Json<TimeOffRequestInput>,
) -> Result<HttpResponse, AppError> {
    let requester = auth_service.current_user(&claims).await?;
    let input = input.into_inner();

    if input.start_date > input.end_date {
        return Err(AppError::BadRequest(
            "Start date must not be after end date".to_string(),
        ));
    }

    let request = time_off
        .create(NewTimeOffRequest {
            user_id: requester.id,
            request_type: input.request_type,
            start_date: input.start_date,
            end_date: input.end_date,
            duration: input.duration,
            reason: input.reason,
        })
        .await?;

    let admins: Vec<i64> = users
        .list()
        .await?
        .into_iter()
        .filter(|u| u.role == UserRole::Admin && u.is_active)
        .map(|u| u.id)
        .collect();
    notifier
        .notify_all(
            &admins,
            NotificationType::TimeOffRequest,
            &format!("New time-off request from {}", requester.name),
            json!({
                "requestId": request.id,
                "userId": request.user_id,
                "userName": requester.name,
                "startDate": request.start_date,
                "endDate": request.end_date,
                "type": request.request_type,
            }),
        )
        .await;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

async fn decide(
    claims: Claims,
    time_off: &dyn TimeOffRepository,
    notifier: &NotificationService,
    id: i64,
    status: TimeOffStatus,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;

    let request = time_off
        .set_status(id, status, claims.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;

    let (notification_type, message) = match status {
        TimeOffStatus::Approved => (
            NotificationType::RequestApproved,
            "Your time-off request has been approved",
        ),
        _ => (
            NotificationType::RequestRejected,
            "Your time-off request has been rejected",
        ),
    };
    let result = notifier
        .notify(
            request.user_id,
            notification_type,
            message,
            json!({
                "requestId": request.id,
                "startDate": request.start_date,
                "endDate": request.end_date,
                "type": request.request_type,
            }),
        )
        .await;
    if let Err(e) = result {
        log::error!("Failed to notify user {} of request {}: {}", request.user_id, request.id, e);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn approve_request(
    claims: Claims,
    time_off: web::Data<dyn TimeOffRepository>,
    notifier: web::Data<NotificationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    decide(claims, &**time_off, &notifier, path.into_inner(), TimeOffStatus::Approved).await
}

pub async fn reject_request(
    claims: Claims,
    time_off: web::Data<dyn TimeOffRepository>,
    notifier: web::Data<NotificationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    decide(claims, &**time_off, &notifier, path.into_inner(), TimeOffStatus::Rejected).await
}
