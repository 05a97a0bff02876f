use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::database::{
    models::{NewTimeOffRequest, TimeOffRequest, TimeOffStatus},
    utils::sql,
};

#[async_trait]
pub trait TimeOffRepository: Send + Sync {
    async fn create(&self, request: NewTimeOffRequest) -> Result<TimeOffRequest>;
    async fn find_by_id(&self, id: i64) -> Result<Option<TimeOffRequest>>;
    /// All requests, or only those of `user_id`, newest first.
    async fn list(&self, user_id: Option<i64>) -> Result<Vec<TimeOffRequest>>;
    /// Approved requests whose range intersects `[start, end]`.
    async fn list_approved_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeOffRequest>>;
    async fn set_status(
        &self,
        id: i64,
        status: TimeOffStatus,
        decided_by: i64,
    ) -> Result<Option<TimeOffRequest>>;
}

#[derive(Clone)]
pub struct PgTimeOffRepository {
    pool: PgPool,
}

impl PgTimeOffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const TIME_OFF_COLUMNS: &str = "id, user_id, request_type, start_date, end_date, duration, \
                                status, reason, approved_by, created_at, updated_at";

#[async_trait]
impl TimeOffRepository for PgTimeOffRepository {
    async fn create(&self, request: NewTimeOffRequest) -> Result<TimeOffRequest> {
        let now = Utc::now();
        let time_off = sqlx::query_as::<_, TimeOffRequest>(&sql(&format!(
            r#"
            INSERT INTO time_off_requests (
                user_id, request_type, start_date, end_date, duration,
                status, reason, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {TIME_OFF_COLUMNS}
            "#
        )))
        .bind(request.user_id)
        .bind(request.request_type)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.duration)
        .bind(TimeOffStatus::Pending)
        .bind(request.reason)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(time_off)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<TimeOffRequest>> {
        let time_off = sqlx::query_as::<_, TimeOffRequest>(&sql(&format!(
            "SELECT {TIME_OFF_COLUMNS} FROM time_off_requests WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_off)
    }

    async fn list(&self, user_id: Option<i64>) -> Result<Vec<TimeOffRequest>> {
        let requests = sqlx::query_as::<_, TimeOffRequest>(&sql(&format!(
            r#"
            SELECT {TIME_OFF_COLUMNS} FROM time_off_requests
            WHERE (?::BIGINT IS NULL OR user_id = ?)
            ORDER BY created_at DESC, id DESC
            "#
        )))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn list_approved_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeOffRequest>> {
        let requests = sqlx::query_as::<_, TimeOffRequest>(&sql(&format!(
            r#"
            SELECT {TIME_OFF_COLUMNS} FROM time_off_requests
            WHERE status = ? AND start_date <= ? AND end_date >= ?
            ORDER BY id
            "#
        )))
        .bind(TimeOffStatus::Approved)
        .bind(end)
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn set_status(
        &self,
        id: i64,
        status: TimeOffStatus,
        decided_by: i64,
    ) -> Result<Option<TimeOffRequest>> {
        let time_off = sqlx::query_as::<_, TimeOffRequest>(&sql(&format!(
            r#"
            UPDATE time_off_requests SET status = ?, approved_by = ?, updated_at = ?
            WHERE id = ?
            RETURNING {TIME_OFF_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(decided_by)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(time_off)
    }
}
