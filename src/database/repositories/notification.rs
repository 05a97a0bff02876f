use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::{
    models::{Notification, NotificationInput},
    utils::sql,
};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, input: NotificationInput) -> Result<Notification>;
    /// The user's notifications, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>>;
    /// Marks one notification read; false when it does not exist or belongs to someone else.
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool>;
    /// Returns how many notifications changed.
    async fn mark_all_read(&self, user_id: i64) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, notification_type, message, is_read, data, created_at";

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, input: NotificationInput) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&sql(&format!(
            r#"
            INSERT INTO notifications (user_id, notification_type, message, is_read, data, created_at)
            VALUES (?, ?, ?, FALSE, ?, ?)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        )))
        .bind(input.user_id)
        .bind(input.notification_type)
        .bind(input.message)
        .bind(input.data)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&sql(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#
        )))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(&sql(
            "UPDATE notifications SET is_read = TRUE WHERE id = ? AND user_id = ?",
        ))
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(&sql(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = ? AND is_read = FALSE",
        ))
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
