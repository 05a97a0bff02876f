use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::database::repositories::NotificationRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn list_notifications(
    claims: Claims,
    notifications: web::Data<dyn NotificationRepository>,
) -> Result<HttpResponse, AppError> {
    let items = notifications.list_for_user(claims.user_id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

pub async fn mark_read(
    claims: Claims,
    notifications: web::Data<dyn NotificationRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    // Someone else's notification looks the same as a missing one
    if !notifications.mark_read(id, claims.user_id()).await? {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Notification marked as read",
    )))
}

pub async fn mark_all_read(
    claims: Claims,
    notifications: web::Data<dyn NotificationRepository>,
) -> Result<HttpResponse, AppError> {
    let updated = notifications.mark_all_read(claims.user_id()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "updated": updated }))))
}
