use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::{
    models::{Shift, ShiftInput, ShiftPatch},
    utils::sql,
};

#[async_trait]
pub trait ShiftRepository: Send + Sync {
    async fn create(&self, input: ShiftInput) -> Result<Shift>;
    /// Inserts a batch atomically; either every shift is stored or none.
    async fn create_many(&self, inputs: Vec<ShiftInput>) -> Result<Vec<Shift>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Shift>>;
    async fn list_by_schedule(&self, schedule_id: i64) -> Result<Vec<Shift>>;
    async fn list_by_schedule_and_user(&self, schedule_id: i64, user_id: i64)
    -> Result<Vec<Shift>>;
    async fn update(&self, id: i64, patch: ShiftPatch) -> Result<Option<Shift>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgShiftRepository {
    pool: PgPool,
}

impl PgShiftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, input: ShiftInput) -> Result<Shift> {
        let shift = sqlx::query_as::<_, Shift>(&sql(&format!(
            r#"
            INSERT INTO shifts (schedule_id, user_id, day, start_time, end_time, shift_type, notes, area)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {SHIFT_COLUMNS}
            "#
        )))
        .bind(input.schedule_id)
        .bind(input.user_id)
        .bind(input.day)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(input.shift_type)
        .bind(input.notes)
        .bind(input.area)
        .fetch_one(&mut **tx)
        .await?;

        Ok(shift)
    }
}

const SHIFT_COLUMNS: &str =
    "id, schedule_id, user_id, day, start_time, end_time, shift_type, notes, area";

#[async_trait]
impl ShiftRepository for PgShiftRepository {
    async fn create(&self, input: ShiftInput) -> Result<Shift> {
        let mut tx = self.pool.begin().await?;
        let shift = Self::insert(&mut tx, input).await?;
        tx.commit().await?;

        Ok(shift)
    }

    async fn create_many(&self, inputs: Vec<ShiftInput>) -> Result<Vec<Shift>> {
        let mut tx = self.pool.begin().await?;
        let mut shifts = Vec::with_capacity(inputs.len());
        for input in inputs {
            shifts.push(Self::insert(&mut tx, input).await?);
        }
        tx.commit().await?;

        Ok(shifts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&sql(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    async fn list_by_schedule(&self, schedule_id: i64) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&sql(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE schedule_id = ? ORDER BY id"
        )))
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    async fn list_by_schedule_and_user(
        &self,
        schedule_id: i64,
        user_id: i64,
    ) -> Result<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&sql(&format!(
            "SELECT {SHIFT_COLUMNS} FROM shifts WHERE schedule_id = ? AND user_id = ? ORDER BY id"
        )))
        .bind(schedule_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shifts)
    }

    async fn update(&self, id: i64, patch: ShiftPatch) -> Result<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&sql(&format!(
            r#"
            UPDATE shifts SET
                user_id = COALESCE(?, user_id),
                day = COALESCE(?, day),
                start_time = COALESCE(?, start_time),
                end_time = COALESCE(?, end_time),
                shift_type = COALESCE(?, shift_type),
                notes = COALESCE(?, notes),
                area = COALESCE(?, area)
            WHERE id = ?
            RETURNING {SHIFT_COLUMNS}
            "#
        )))
        .bind(patch.user_id)
        .bind(patch.day)
        .bind(patch.start_time)
        .bind(patch.end_time)
        .bind(patch.shift_type)
        .bind(patch.notes)
        .bind(patch.area)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shift)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&sql("DELETE FROM shifts WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
