use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use review_rag::{IndexSummary, InputFormat, Mode, ReviewRagService};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    error::ApiError,
    protocol::{AskRequest, AskResponse, IndexResponse, StatsResponse},
};

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReviewRagService>,
    /// Bundled reviews indexed when the form asks for the sample.
    pub sample_path: PathBuf,
}

impl AppState {
    pub fn new(service: Arc<ReviewRagService>, sample_path: impl Into<PathBuf>) -> Self {
        Self { service, sample_path: sample_path.into() }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8501 }
    }
}

impl ServerConfig {
    /// `REVIEW_RAG_HOST` / `REVIEW_RAG_PORT` over the defaults; an unparsable port is ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("REVIEW_RAG_HOST").unwrap_or(defaults.host);
        let port = std::env::var("REVIEW_RAG_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        Self { host, port }
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/index", post(index_reviews))
        .route("/api/ask", post(ask))
        .route("/api/reset", post(reset))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for review-rag-web server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("review-rag-web listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> impl IntoResponse {
    Html(include_str!("../ui/index.html"))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status":"ok","service":"review-rag-web"}))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let chunks = state.service.count().await?;
    Ok(Json(StatsResponse { chunks }))
}

/// An uploaded review file.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("invalid upload: {err}"))
}

fn is_checked(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes")
}

async fn index_reviews(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IndexResponse>, ApiError> {
    let mut upload = None;
    let mut use_sample = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                // Browsers send an unnamed, empty part when no file was chosen.
                let filename = field.file_name().map(str::to_string).unwrap_or_default();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !filename.is_empty() {
                    upload = Some(Upload { filename, bytes: bytes.to_vec() });
                }
            }
            Some("use_sample") => {
                use_sample = is_checked(&field.text().await.map_err(multipart_error)?);
            }
            other => warn!(field = ?other, "ignoring unknown form field"),
        }
    }

    let (source, summary) = if let Some(upload) = upload {
        let summary = index_upload(&state, &upload).await?;
        (upload.filename, summary)
    } else if use_sample {
        let summary = state.service.index_file(&state.sample_path).await?;
        ("sample".to_string(), summary)
    } else {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    };

    Ok(Json(IndexResponse {
        message: format!("Indexed {} chunks from {} reviews.", summary.chunks, summary.reviews),
        source,
        reviews: summary.reviews,
        chunks: summary.chunks,
    }))
}

/// Keep a copy of the upload under the raw-data directory, then index it.
async fn index_upload(state: &AppState, upload: &Upload) -> Result<IndexSummary, ApiError> {
    let filename = Path::new(&upload.filename)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ApiError::BadRequest("invalid file name".to_string()))?;
    InputFormat::from_path(Path::new(filename))?;

    let raw_dir = &state.service.config().raw_data_path;
    tokio::fs::create_dir_all(raw_dir).await.map_err(review_rag::ReviewRagError::from)?;
    tokio::fs::write(raw_dir.join(filename), &upload.bytes)
        .await
        .map_err(review_rag::ReviewRagError::from)?;

    Ok(state.service.index_bytes(filename, &upload.bytes).await?)
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".to_string()));
    }
    let mode: Mode = request.mode.parse()?;

    let answer = state.service.ask(question, mode, request.rating_filter()).await?;
    Ok(Json(AskResponse { answer: answer.answer, mode, sources: answer.sources }))
}

async fn reset(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    state.service.reset().await?;
    Ok(Json(StatsResponse { chunks: state.service.count().await? }))
}
