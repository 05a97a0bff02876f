use actix_web::{HttpResponse, web};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::{DocumentInput, DocumentSummary, DocumentType, NotificationType};
use crate::database::repositories::{DocumentRepository, UserRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::notifier::NotificationService;

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    #[serde(rename = "type")]
    pub document_type: Option<DocumentType>,
}

/// Strips an optional `data:` URL prefix and checks the payload is a PDF.
fn normalize_pdf(file_data: &str) -> Result<String, AppError> {
    let encoded = match file_data.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => file_data,
    }
    .trim();

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| AppError::BadRequest("File data must be base64 encoded".to_string()))?;
    if !bytes.starts_with(b"%PDF") {
        return Err(AppError::BadRequest("File must be a PDF".to_string()));
    }

    Ok(encoded.to_string())
}

pub async fn upload_document(
    claims: Claims,
    documents: web::Data<dyn DocumentRepository>,
    users: web::Data<dyn UserRepository>,
    notifier: web::Data<NotificationService>,
    input: web::Json<DocumentInput>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;
    let mut input = input.into_inner();

    if input.period.trim().is_empty() || input.filename.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Period and filename are required".to_string(),
        ));
    }
    input.file_data = normalize_pdf(&input.file_data)?;
    if users.find_by_id(input.user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let document = documents.create(input, claims.user_id()).await?;

    let result = notifier
        .notify(
            document.user_id,
            NotificationType::DocumentUpload,
            format!("New {} available", document.document_type.label()),
            json!({
                "documentId": document.id,
                "type": document.document_type,
                "period": document.period,
            }),
        )
        .await;
    if let Err(e) = result {
        log::error!("Failed to notify user {} of document {}: {}", document.user_id, document.id, e);
    }

    Ok(HttpResponse::Created().json(ApiResponse::success(
        DocumentSummary::from(document),
    )))
}

/// Listing omits the file payload; fetch a single document to download it.
pub async fn list_documents(
    claims: Claims,
    documents: web::Data<dyn DocumentRepository>,
    query: web::Query<DocumentQuery>,
) -> Result<HttpResponse, AppError> {
    let owner = (!claims.is_admin()).then(|| claims.user_id());

    let items: Vec<DocumentSummary> = documents
        .list(owner, query.document_type)
        .await?
        .into_iter()
        .map(DocumentSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

pub async fn get_document(
    claims: Claims,
    documents: web::Data<dyn DocumentRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let document = documents
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
    claims.requires_self_or_admin(document.user_id)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(document)))
}

pub async fn delete_document(
    claims: Claims,
    documents: web::Data<dyn DocumentRepository>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    claims.requires_admin()?;

    if !documents.delete(path.into_inner()).await? {
        return Err(AppError::NotFound("Document not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Document deleted",
    )))
}
