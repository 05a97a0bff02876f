use actix_web::{HttpResponse, web};

use crate::database::models::{CreateUserInput, NewUser, UpdateUserInput, UserChanges};
use crate::database::repositories::UserRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::{AuthService, Claims};

pub async fn list_users(
    claims: Claims,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(users.list().await?)))
}

pub async fn create_user(
    claims: Claims,
    users: web::Data<dyn UserRepository>,
    auth_service: web::Data<AuthService>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let input = input.into_inner();

    let username = input.username.trim().to_string();
    if username.is_empty() || input.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Username and name are required".to_string(),
        ));
    }
    if input.password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if users.find_by_username(&username).await?.is_some() {
        return Err(AppError::BadRequest("Username already exists".to_string()));
    }

    let user = users
        .create(NewUser {
            username,
            password_hash: auth_service.hash_password(&input.password)?,
            name: input.name.trim().to_string(),
            email: input.email,
            role: input.role.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
        })
        .await?;
    log::info!("User {} created by {}", user.username, claims.username);

    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

pub async fn get_user(
    claims: Claims,
    users: web::Data<dyn UserRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    claims.requires_self_or_admin(user_id)?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

pub async fn update_user(
    claims: Claims,
    users: web::Data<dyn UserRepository>,
    auth_service: web::Data<AuthService>,
    path: web::Path<i64>,
    input: web::Json<UpdateUserInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let user_id = path.into_inner();
    let input = input.into_inner();

    let password_hash = match input.password.as_deref() {
        Some(password) if password.len() < 6 => {
            return Err(AppError::BadRequest(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        Some(password) => Some(auth_service.hash_password(password)?),
        None => None,
    };

    let user = users
        .update(
            user_id,
            UserChanges {
                name: input.name,
                email: input.email,
                role: input.role,
                is_active: input.is_active,
                password_hash,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}
