//! Axum route handlers for the notebook HTTP API.
//!
//! # Responsibility
//! - Decode requests, run core use-cases off the async executor, and map
//!   typed core errors to status codes and JSON bodies.
//!
//! # Invariants
//! - Core calls always run on `spawn_blocking`; they take the store mutex
//!   and may block on the lookup collaborator.
//! - Every failure body carries a stable `error_code`, including bodies and
//!   query strings axum itself rejects.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use notebook_core::{
    core_version, repo_error_code, DocumentStore, EnrichmentError, LinkEnrichmentService, Note,
    NoteService, NoteServiceError, RepoError, SearchLookup, SnapshotNoteRepository, StoreError,
    TopicSummary,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct AppState {
    pub notes: NoteService<SnapshotNoteRepository>,
    pub enrichment: LinkEnrichmentService<SnapshotNoteRepository>,
}

impl AppState {
    /// Builds both services over one shared store.
    pub fn new(store: Arc<DocumentStore>, lookup: Arc<dyn SearchLookup>) -> Self {
        Self {
            notes: NoteService::new(SnapshotNoteRepository::new(store.clone())),
            enrichment: LinkEnrichmentService::new(SnapshotNoteRepository::new(store), lookup),
        }
    }
}

// ── Request / response bodies ───────────────────────

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub topic: String,
    pub name: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteNoteRequest {
    pub topic: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTopicRequest {
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLinksRequest {
    pub topic: String,
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub message: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    error_code: &'static str,
}

/// Failure response with a status, stable code and human message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn unexpected() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "unexpected",
            "An unexpected error occurred",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            error_code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        let code = repo_error_code(&value);
        match value {
            RepoError::StoreNotFound => Self::new(StatusCode::NOT_FOUND, code, "Database not found"),
            RepoError::TopicNotFound(topic) => Self::new(
                StatusCode::NOT_FOUND,
                code,
                format!("Topic \"{topic}\" not found"),
            ),
            RepoError::NoteNotFound { name, .. } => {
                Self::new(StatusCode::NOT_FOUND, code, format!("Note \"{name}\" not found"))
            }
            RepoError::Store(StoreError::ReadFailure { .. }) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "Failed to read notes",
            ),
            RepoError::Store(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "Failed to save notes",
            ),
        }
    }
}

impl From<NoteServiceError> for ApiError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::InvalidInput(details) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_input", details)
            }
            NoteServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<EnrichmentError> for ApiError {
    fn from(value: EnrichmentError) -> Self {
        match value {
            EnrichmentError::InvalidInput(details) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_input", details)
            }
            EnrichmentError::LookupUnavailable(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                "lookup_unavailable",
                "Failed to query the lookup service",
            ),
            EnrichmentError::NoResults(_) => Self::new(
                StatusCode::NOT_FOUND,
                "no_results",
                "No article found for the search term",
            ),
            EnrichmentError::Repo(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", value.body_text())
    }
}

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

fn message(text: impl Into<String>) -> ApiResult<MessageResponse> {
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: text.into(),
        }),
    ))
}

async fn run_blocking<T, E>(
    state: Arc<AppState>,
    work: impl FnOnce(&AppState) -> Result<T, E> + Send + 'static,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&state)).await {
        Ok(result) => result.map_err(Into::into),
        Err(err) => {
            error!("event=http_handler module=http status=error error_code=unexpected error={err}");
            Err(ApiError::unexpected())
        }
    }
}

// POST /add_note
pub async fn add_note(
    State(state): State<Arc<AppState>>,
    req: Result<Json<AddNoteRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(req) = req?;
    run_blocking(state, move |state| {
        state.notes.add_note(&req.topic, req.name, req.text)
    })
    .await?;
    message("Note added successfully")
}

// GET /get_notes?topic=
pub async fn get_notes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TopicQuery>, QueryRejection>,
) -> ApiResult<Vec<Note>> {
    let Query(query) = query?;
    let notes = run_blocking(state, move |state| state.notes.list_notes(&query.topic)).await?;
    Ok((StatusCode::OK, Json(notes)))
}

// POST /delete_note
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    req: Result<Json<DeleteNoteRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(req) = req?;
    run_blocking(state, move |state| {
        state.notes.delete_note(&req.topic, &req.name)
    })
    .await?;
    message("Note deleted successfully")
}

// POST /delete_all_notes
pub async fn delete_all_notes(
    State(state): State<Arc<AppState>>,
    req: Result<Json<DeleteTopicRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let Json(req) = req?;
    let topic = req.topic.clone();
    run_blocking(state, move |state| state.notes.delete_topic(&req.topic)).await?;
    message(format!(
        "All notes under topic \"{topic}\" have been deleted successfully"
    ))
}

// POST /add_wiki_info
pub async fn add_links(
    State(state): State<Arc<AppState>>,
    req: Result<Json<AddLinksRequest>, JsonRejection>,
) -> ApiResult<LinksResponse> {
    let Json(req) = req?;
    let urls = run_blocking(state, move |state| {
        state
            .enrichment
            .append_search_links(&req.topic, &req.search_term)
    })
    .await?;
    Ok((
        StatusCode::OK,
        Json(LinksResponse {
            message: "Links added successfully".to_string(),
            urls,
        }),
    ))
}

// GET /topics
pub async fn list_topics(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TopicSummary>> {
    let topics = run_blocking(state, |state| state.notes.list_topics()).await?;
    Ok((StatusCode::OK, Json(topics)))
}

// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: core_version(),
    })
}
