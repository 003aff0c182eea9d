//! OpenAPI specification endpoints

use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::analysis::analyze_text,
        crate::api::analysis::analyze_upload,
        crate::api::analysis::ask_question,
        crate::api::analysis::list_analyses,
        crate::api::analysis::get_analysis,
        crate::api::analysis::delete_analysis,
        crate::api::samples::sample_contracts,
        crate::api::health::liveness,
        crate::api::health::readiness,
    ),
    components(schemas(
        crate::api::analysis::AnalyzeTextRequest,
        crate::api::analysis::AnalysisResponse,
        crate::api::analysis::QuestionRequest,
        crate::api::samples::SampleContract,
        crate::db::models::AnalysisSummaryRow,
        crate::model::AnalysisResult,
        crate::model::QuestionAnswer,
    )),
    tags(
        (name = "analyses", description = "Document analysis"),
        (name = "questions", description = "Follow-up questions"),
        (name = "samples", description = "Demo data"),
        (name = "health", description = "Health probes")
    ),
    info(
        title = "Contract Intel",
        description = "AI-assisted legal document analysis service"
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> impl Responder {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => HttpResponse::Ok().content_type("text/yaml").body(yaml),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render OpenAPI YAML");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
