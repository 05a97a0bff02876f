use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::{
    models::{NewUser, User, UserChanges},
    utils::sql,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;
    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, name, email, role, is_active, last_login";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        )))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            r#"
            INSERT INTO users (username, password_hash, name, email, role, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        )))
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.email)
        .bind(user.role)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                role = COALESCE(?, role),
                is_active = COALESCE(?, is_active),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        )))
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role)
        .bind(changes.is_active)
        .bind(changes.password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        sqlx::query(&sql("UPDATE users SET last_login = ? WHERE id = ?"))
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
