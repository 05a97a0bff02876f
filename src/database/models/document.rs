use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum DocumentType {
        Payslip => "payslip",
        TaxDocument => "tax_document",
    }
}

impl DocumentType {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Payslip => "payslip",
            DocumentType::TaxDocument => "tax document",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub period: String,
    pub filename: String,
    pub file_data: String,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Listing view without the base64 payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub period: String,
    pub filename: String,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Document> for DocumentSummary {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            user_id: document.user_id,
            document_type: document.document_type,
            period: document.period,
            filename: document.filename,
            uploaded_by: document.uploaded_by,
            uploaded_at: document.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub period: String,
    pub filename: String,
    pub file_data: String,
}
