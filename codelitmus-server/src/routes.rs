//! HTTP handlers for CodeLitmus server.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, Responder, get, http::header, post, web};
use codelitmus_core::{PythonAnalyzer, Scorer, ScorerConfig, decode_source};
use futures::StreamExt;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const UPLOAD_FIELD: &str = "file";

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Settings passed to every per-request scorer.
    pub scorer: ScorerConfig,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Multipart form accepted by `/analyze/`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AnalyzeUpload {
    /// Python source file, UTF-8 encoded.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug)]
struct Upload {
    filename: String,
    contents: Vec<u8>,
}

#[derive(Debug)]
enum UploadError {
    Missing,
    TooLarge(usize),
    Malformed(MultipartError),
}

impl UploadError {
    fn into_response(self) -> HttpResponse {
        match self {
            Self::Missing => HttpResponse::BadRequest().json(ErrorResponse {
                error: "No file selected or invalid filename!".to_string(),
            }),
            Self::TooLarge(limit) => HttpResponse::PayloadTooLarge().json(ErrorResponse {
                error: format!("File exceeds the maximum upload size of {limit} bytes!"),
            }),
            Self::Malformed(err) => HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("Invalid multipart payload: {err}"),
            }),
        }
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        Self::Malformed(err)
    }
}

async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Upload, UploadError> {
    while let Some(field) = payload.next().await {
        let mut field = field?;
        if field.name() != Some(UPLOAD_FIELD) {
            drain(&mut field).await?;
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if filename.is_empty() {
            return Err(UploadError::Missing);
        }

        let mut contents = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if contents.len() + chunk.len() > limit {
                return Err(UploadError::TooLarge(limit));
            }
            contents.extend_from_slice(&chunk);
        }
        return Ok(Upload { filename, contents });
    }
    Err(UploadError::Missing)
}

async fn drain(field: &mut Field) -> Result<(), MultipartError> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Analysis page", content_type = "text/html", body = String)
    ),
    tag = "system"
)]
#[get("/")]
/// Serve the single-page analysis UI.
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
        .body(INDEX_HTML)
}

#[utoipa::path(
    post,
    path = "/analyze/",
    request_body(content = AnalyzeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis result", body = codelitmus_core::ScoreResult),
        (status = 400, description = "Missing file or invalid encoding", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Analysis failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[post("/analyze/")]
/// Score an uploaded Python file.
pub async fn analyze(state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let upload = match read_upload(&mut payload, state.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(err) => {
            warn!("rejected upload: {err:?}");
            return err.into_response();
        }
    };

    let code = match decode_source(upload.contents) {
        Ok(code) => code,
        Err(err) => {
            warn!("rejected upload {}: {err}", upload.filename);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "File must be a text file with valid UTF-8 encoding!".to_string(),
            });
        }
    };

    let config = state.scorer.clone();
    let result =
        web::block(move || Scorer::with_config(PythonAnalyzer::new(), config).score(&code)).await;

    match result {
        Ok(result) => {
            info!(
                "analyzed {}: verdict={} score={}",
                upload.filename, result.verdict, result.score
            );
            HttpResponse::Ok().json(result)
        }
        Err(err) => {
            error!("analysis of {} failed: {err}", upload.filename);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Error analyzing code: {err}"),
            })
        }
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
