use actix_web::{HttpResponse, web};

use crate::database::models::LoginInput;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::{AuthService, Claims};

pub async fn login(
    auth_service: web::Data<AuthService>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = auth_service.login(input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(claims: Claims) -> Result<HttpResponse, AppError> {
    log::info!("User {} logged out", claims.username);

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Logged out successfully",
    )))
}

pub async fn me(
    claims: Claims,
    auth_service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let user = auth_service.current_user(&claims).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}
