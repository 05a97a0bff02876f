use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use anyhow::{Result, anyhow};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::models::{AuthResponse, LoginInput, NewUser, User, UserRole};
use crate::database::repositories::UserRepository;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // user id
    pub username: String,
    pub role: UserRole,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn requires_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Admins may act on anyone; everyone else only on themselves.
    pub fn requires_self_or_admin(&self, user_id: i64) -> Result<(), AppError> {
        if self.is_admin() || self.sub == user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Forbidden".to_string()))
        }
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

impl FromRequest for Claims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return ready(Err(AppError::Unauthorized(
                "Missing or invalid authorization header".to_string(),
            )));
        };

        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config missing from app data");
            return ready(Err(AppError::internal_server_error()));
        };

        ready(
            decode_token(token, &config.jwt_secret)
                .map_err(|_| AppError::Unauthorized("Invalid token".to_string())),
        )
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    config: Config,
}

impl AuthService {
    pub fn new(config: Config, user_repository: Arc<dyn UserRepository>) -> Self {
        Self {
            user_repository,
            config,
        }
    }

    pub async fn login(&self, request: LoginInput) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        if !verify(&request.password, &user.password_hash).map_err(anyhow::Error::from)? {
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        if !user.is_active {
            return Err(AppError::Unauthorized(
                "User account is disabled".to_string(),
            ));
        }

        self.user_repository.touch_last_login(user.id).await?;
        let token = self.generate_token(&user)?;
        log::info!("User {} logged in", user.username);

        Ok(AuthResponse { token, user })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode_token(token, &self.config.jwt_secret)
    }

    /// Loads the user behind a token, rejecting deactivated accounts.
    pub async fn current_user(&self, claims: &Claims) -> Result<User, AppError> {
        let user = self
            .user_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized(
                "User account is disabled".to_string(),
            ));
        }

        Ok(user)
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        Ok(hash(password, self.config.bcrypt_cost)?)
    }

    pub fn generate_token(&self, user: &User) -> Result<String> {
        let expiration = Duration::try_days(self.config.jwt_expiration_days)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| anyhow!("token expiration overflow"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: expiration,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }

    /// Creates the configured admin account when no user has that username.
    pub async fn ensure_admin(&self) -> Result<()> {
        let username = &self.config.admin_username;
        if self.user_repository.find_by_username(username).await?.is_some() {
            return Ok(());
        }

        self.user_repository
            .create(NewUser {
                username: username.clone(),
                password_hash: self.hash_password(&self.config.admin_password)?,
                name: "Administrator".to_string(),
                email: Some("admin@staffsync.com".to_string()),
                role: UserRole::Admin,
                is_active: true,
            })
            .await?;
        log::info!("Seeded admin account '{}'", username);

        Ok(())
    }
}
