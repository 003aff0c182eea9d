//! REST API endpoints for document analysis and question answering

use actix_multipart::Multipart;
use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::repository::AnalysisRepository;
use crate::extract::{self, DocumentFormat};
use crate::model::{AnalysisRecord, AnalysisResult, AnalysisType, QuestionAnswer};
use crate::service::analysis::Resolution;
use crate::service::cache::{document_cache_key, AnalysisCache};
use crate::service::AnalysisService;

const DEFAULT_DOCUMENT_NAME: &str = "Untitled Document";
/// Stored document text is truncated to this many characters
const STORED_TEXT_CHARS: usize = 1000;

const MIN_QUESTION_CHARS: usize = 5;
const MAX_QUESTION_CHARS: usize = 500;

/// Request to analyze raw document text
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeTextRequest {
    /// Document text, 10 to 100,000 characters after trimming
    pub document_text: String,
    pub document_name: Option<String>,
    pub analysis_type: Option<AnalysisType>,
}

/// A completed analysis
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub analysis_id: String,
    pub document_name: String,
    pub analysis_type: AnalysisType,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

impl AnalysisResponse {
    fn from_record(record: AnalysisRecord) -> Self {
        Self {
            analysis_id: record.id,
            document_name: record.document_name,
            analysis_type: record.analysis_type,
            file_type: record.file_type,
            created_at: record.created_at,
            result: record.analysis,
        }
    }
}

/// Question about a previously analyzed document
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionRequest {
    pub analysis_id: String,
    /// Question text, 5 to 500 characters
    pub question: String,
}

/// Query parameters for listing analyses
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAnalysesParams {
    /// Maximum number of entries to return (default: 50, max: 100)
    pub limit: Option<u32>,
}

/// Analyze legal document text and extract key information
#[utoipa::path(
    post,
    path = "/v1/analyses",
    request_body = AnalyzeTextRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResponse),
        (status = 400, description = "Invalid document text"),
        (status = 503, description = "Model client not configured")
    ),
    tag = "analyses"
)]
#[post("/v1/analyses")]
pub async fn analyze_text(
    service: web::Data<AnalysisService>,
    repository: web::Data<AnalysisRepository>,
    cache: web::Data<Option<AnalysisCache>>,
    request: web::Json<AnalyzeTextRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();

    let document_text = request.document_text.trim().to_string();
    extract::validate_length(&document_text)?;

    let document_name = request
        .document_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());

    let record = run_analysis(
        &service,
        &repository,
        cache.get_ref(),
        &document_text,
        &document_name,
        request.analysis_type.unwrap_or_default(),
        None,
    )
    .await?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::from_record(record)))
}

/// Analyze an uploaded document file (TXT, DOCX, PDF)
#[utoipa::path(
    post,
    path = "/v1/analyses/upload",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "Document file plus optional analysis_type field"),
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResponse),
        (status = 400, description = "Invalid or undecodable document"),
        (status = 415, description = "Unsupported file format"),
        (status = 503, description = "Model client not configured")
    ),
    tag = "analyses"
)]
#[post("/v1/analyses/upload")]
pub async fn analyze_upload(
    service: web::Data<AnalysisService>,
    repository: web::Data<AnalysisRepository>,
    cache: web::Data<Option<AnalysisCache>>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload).await?;

    let file_name = upload
        .file_name
        .ok_or_else(|| ApiError::BadRequest("No filename provided".to_string()))?;

    let format = DocumentFormat::from_filename(&file_name)?;
    let document_text = extract::extract(&upload.file_bytes, format)?;

    let record = run_analysis(
        &service,
        &repository,
        cache.get_ref(),
        &document_text,
        &file_name,
        upload.analysis_type,
        Some(format.extension().to_string()),
    )
    .await?;

    Ok(HttpResponse::Ok().json(AnalysisResponse::from_record(record)))
}

/// Ask a question about a previously analyzed document
#[utoipa::path(
    post,
    path = "/v1/questions",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Question answered", body = QuestionAnswer),
        (status = 400, description = "Invalid question"),
        (status = 404, description = "Analysis not found"),
        (status = 503, description = "Model client not configured")
    ),
    tag = "questions"
)]
#[post("/v1/questions")]
pub async fn ask_question(
    service: web::Data<AnalysisService>,
    repository: web::Data<AnalysisRepository>,
    request: web::Json<QuestionRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();

    let question = request.question.trim().to_string();
    let chars = question.chars().count();
    if !(MIN_QUESTION_CHARS..=MAX_QUESTION_CHARS).contains(&chars) {
        return Err(ApiError::BadRequest(format!(
            "Question must be between {} and {} characters, got {}",
            MIN_QUESTION_CHARS, MAX_QUESTION_CHARS, chars
        )));
    }

    let record = repository.get_by_id(&request.analysis_id).await?;

    let answer = service
        .answer_question(
            &record.document_text,
            &question,
            Some(&record.analysis.document_summary),
        )
        .await?;

    Ok(HttpResponse::Ok().json(answer))
}

/// List recent analyses, newest first
#[utoipa::path(
    get,
    path = "/v1/analyses",
    params(ListAnalysesParams),
    responses(
        (status = 200, description = "Analyses retrieved", body = [crate::db::models::AnalysisSummaryRow])
    ),
    tag = "analyses"
)]
#[get("/v1/analyses")]
pub async fn list_analyses(
    repository: web::Data<AnalysisRepository>,
    query: web::Query<ListAnalysesParams>,
) -> Result<HttpResponse, ApiError> {
    let summaries = repository.list_recent(query.limit).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/// Get a stored analysis by ID
#[utoipa::path(
    get,
    path = "/v1/analyses/{id}",
    params(("id" = String, Path, description = "Analysis ID")),
    responses(
        (status = 200, description = "Analysis retrieved", body = AnalysisResponse),
        (status = 404, description = "Analysis not found")
    ),
    tag = "analyses"
)]
#[get("/v1/analyses/{id}")]
pub async fn get_analysis(
    repository: web::Data<AnalysisRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let record = repository.get_by_id(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(AnalysisResponse::from_record(record)))
}

/// Delete a stored analysis by ID
#[utoipa::path(
    delete,
    path = "/v1/analyses/{id}",
    params(("id" = String, Path, description = "Analysis ID")),
    responses(
        (status = 204, description = "Analysis deleted"),
        (status = 404, description = "Analysis not found")
    ),
    tag = "analyses"
)]
#[delete("/v1/analyses/{id}")]
pub async fn delete_analysis(
    repository: web::Data<AnalysisRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if repository.delete(&id).await? {
        tracing::info!(id = %id, "Analysis deleted");
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::AnalysisNotFound(id))
    }
}

/// Run the analysis pipeline and persist the outcome.
///
/// A cached result for identical document text short-circuits the model call;
/// only fully parsed results are written back to the cache so degraded
/// fallbacks are retried on the next request.
async fn run_analysis(
    service: &AnalysisService,
    repository: &AnalysisRepository,
    cache: &Option<AnalysisCache>,
    document_text: &str,
    document_name: &str,
    analysis_type: AnalysisType,
    file_type: Option<String>,
) -> Result<AnalysisRecord, ApiError> {
    let cache_key = document_cache_key(document_text);

    let mut cached = false;
    let analysis = match lookup_cached(cache, &cache_key).await {
        Some(analysis) => {
            cached = true;
            analysis
        }
        None => {
            let resolved = service.analyze(document_text, document_name).await?;
            if resolved.resolution == Resolution::Parsed {
                store_cached(cache, &cache_key, &resolved.result).await;
            }
            resolved.result
        }
    };

    let record = AnalysisRecord {
        id: Uuid::new_v4().to_string(),
        document_name: document_name.to_string(),
        document_text: truncate_for_storage(document_text),
        analysis,
        analysis_type,
        file_type,
        created_at: Utc::now(),
    };

    repository.insert(&record).await?;

    tracing::info!(
        id = %record.id,
        document_name = %document_name,
        cached = cached,
        "Analysis record stored"
    );

    Ok(record)
}

async fn lookup_cached(cache: &Option<AnalysisCache>, key: &str) -> Option<AnalysisResult> {
    let cache = cache.as_ref()?;
    match cache.get_analysis(key).await {
        Ok(analysis) => {
            tracing::debug!(key = %key, "Analysis cache hit");
            Some(analysis)
        }
        Err(_) => None,
    }
}

async fn store_cached(cache: &Option<AnalysisCache>, key: &str, analysis: &AnalysisResult) {
    if let Some(cache) = cache.as_ref() {
        if let Err(e) = cache.set_analysis(key, analysis).await {
            tracing::debug!(key = %key, error = %e, "Failed to cache analysis");
        }
    }
}

struct UploadPayload {
    file_name: Option<String>,
    file_bytes: Vec<u8>,
    analysis_type: AnalysisType,
}

/// Drain a multipart payload into the uploaded file and form fields
async fn read_upload(mut payload: Multipart) -> Result<UploadPayload, ApiError> {
    let mut upload = UploadPayload {
        file_name: None,
        file_bytes: Vec::new(),
        analysis_type: AnalysisType::default(),
    };

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let field_name = field.name().to_string();
        match field_name.as_str() {
            "file" => {
                upload.file_name = field
                    .content_disposition()
                    .get_filename()
                    .map(str::to_string);

                while let Some(chunk) = field
                    .try_next()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
                {
                    upload.file_bytes.extend_from_slice(&chunk);
                }
            }
            "analysis_type" => {
                let mut value = Vec::new();
                while let Some(chunk) = field
                    .try_next()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?
                {
                    value.extend_from_slice(&chunk);
                }
                let value = String::from_utf8_lossy(&value);
                upload.analysis_type = AnalysisType::from_str_or_default(value.trim());
            }
            _ => {}
        }
    }

    Ok(upload)
}

fn truncate_for_storage(document_text: &str) -> String {
    if document_text.chars().count() <= STORED_TEXT_CHARS {
        return document_text.to_string();
    }
    let mut stored: String = document_text.chars().take(STORED_TEXT_CHARS).collect();
    stored.push_str("...");
    stored
}

/// Configure analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(analyze_text)
        .service(analyze_upload)
        .service(ask_question)
        .service(list_analyses)
        .service(get_analysis)
        .service(delete_analysis);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_truncation_keeps_short_text_intact() {
        assert_eq!(truncate_for_storage("short text"), "short text");
    }

    #[test]
    fn storage_truncation_appends_ellipsis() {
        let long = "a".repeat(1500);
        let stored = truncate_for_storage(&long);
        assert_eq!(stored.chars().count(), STORED_TEXT_CHARS + 3);
        assert!(stored.ends_with("..."));
    }
}
