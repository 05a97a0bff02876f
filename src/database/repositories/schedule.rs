use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::database::{
    models::{Schedule, ScheduleInput},
    utils::sql,
};

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, input: ScheduleInput, created_by: i64) -> Result<Schedule>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Schedule>>;
    /// Oldest schedule whose range intersects `[start, end]`.
    async fn find_overlapping(&self, start: NaiveDate, end: NaiveDate)
    -> Result<Option<Schedule>>;
    /// Sets `is_published` and stamps `published_at`, returning the updated row.
    async fn mark_published(&self, id: i64) -> Result<Option<Schedule>>;
}

#[derive(Clone)]
pub struct PgScheduleRepository {
    pool: PgPool,
}

impl PgScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SCHEDULE_COLUMNS: &str =
    "id, start_date, end_date, is_published, published_at, created_by, updated_at";

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn create(&self, input: ScheduleInput, created_by: i64) -> Result<Schedule> {
        let schedule = sqlx::query_as::<_, Schedule>(&sql(&format!(
            r#"
            INSERT INTO schedules (start_date, end_date, is_published, created_by, updated_at)
            VALUES (?, ?, FALSE, ?, ?)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        )))
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(schedule)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(&sql(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    async fn find_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Schedule>> {
        let schedule = sqlx::query_as::<_, Schedule>(&sql(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS} FROM schedules
            WHERE start_date <= ? AND end_date >= ?
            ORDER BY id
            LIMIT 1
            "#
        )))
        .bind(end)
        .bind(start)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    async fn mark_published(&self, id: i64) -> Result<Option<Schedule>> {
        let now = Utc::now();
        let schedule = sqlx::query_as::<_, Schedule>(&sql(&format!(
            r#"
            UPDATE schedules SET is_published = TRUE, published_at = ?, updated_at = ?
            WHERE id = ?
            RETURNING {SCHEDULE_COLUMNS}
            "#
        )))
        .bind(now)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }
}
