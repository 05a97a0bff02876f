use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::{
    models::{Document, DocumentInput, DocumentType},
    utils::sql,
};

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, input: DocumentInput, uploaded_by: i64) -> Result<Document>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Document>>;
    /// Newest first, optionally narrowed to one owner and/or one type.
    async fn list(
        &self,
        user_id: Option<i64>,
        document_type: Option<DocumentType>,
    ) -> Result<Vec<Document>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, document_type, period, filename, file_data, uploaded_by, uploaded_at";

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, input: DocumentInput, uploaded_by: i64) -> Result<Document> {
        let document = sqlx::query_as::<_, Document>(&sql(&format!(
            r#"
            INSERT INTO documents (user_id, document_type, period, filename, file_data, uploaded_by, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        )))
        .bind(input.user_id)
        .bind(input.document_type)
        .bind(input.period)
        .bind(input.filename)
        .bind(input.file_data)
        .bind(uploaded_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(&sql(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn list(
        &self,
        user_id: Option<i64>,
        document_type: Option<DocumentType>,
    ) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(&sql(&format!(
            r#"
            SELECT {DOCUMENT_COLUMNS} FROM documents
            WHERE (?::BIGINT IS NULL OR user_id = ?)
              AND (?::VARCHAR IS NULL OR document_type = ?)
            ORDER BY uploaded_at DESC, id DESC
            "#
        )))
        .bind(user_id)
        .bind(user_id)
        .bind(document_type)
        .bind(document_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&sql("DELETE FROM documents WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
