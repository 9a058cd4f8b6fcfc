//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, CreateSessionResponse, DraftRequest, ErrorResponse,
    SuccessResponse,
};
use super::AppState;
use crate::runtime::{SessionError, SessionHandle};
use crate::surface::WidgetView;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // Widget visibility
        .route("/api/sessions/:id/open", post(open_widget))
        .route("/api/sessions/:id/close", post(close_widget))
        .route("/api/sessions/:id/toggle", post(toggle_widget))
        // User actions
        .route("/api/sessions/:id/draft", post(update_draft))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/suggestions/:index", post(select_suggestion))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

async fn session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    state.sessions.get(id).await.map_err(AppError::from)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let (session_id, _handle) = state.sessions.create().await;
    let active = state.sessions.session_count().await;
    tracing::debug!(active, "Active sessions");
    Json(CreateSessionResponse { session_id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WidgetView>, AppError> {
    let handle = session(&state, &id).await?;
    Ok(Json(handle.view()))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = session(&state, &id).await?;

    // Subscribe before snapshotting so no event falls between the two
    let broadcast_rx = handle.subscribe();
    Ok(sse_stream(handle.view(), broadcast_rx))
}

// ============================================================
// Widget Visibility
// ============================================================

async fn open_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    session(&state, &id).await?.open().await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn close_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    session(&state, &id).await?.close().await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn toggle_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    session(&state, &id).await?.toggle().await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Actions
// ============================================================

async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    session(&state, &id).await?.update_draft(req.text).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let handle = session(&state, &id).await?;
    chat_outcome(handle.submit(req.text).await)
}

async fn select_suggestion(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<ChatResponse>, AppError> {
    let handle = session(&state, &id).await?;
    chat_outcome(handle.select_suggestion(index).await)
}

/// A rejected submission is a normal outcome, not an HTTP error
fn chat_outcome(result: Result<(), SessionError>) -> Result<Json<ChatResponse>, AppError> {
    match result {
        Ok(()) => Ok(Json(ChatResponse {
            accepted: true,
            reason: None,
        })),
        Err(SessionError::Rejected(reason)) => Ok(Json(ChatResponse {
            accepted: false,
            reason: Some(reason.to_string()),
        })),
        Err(e) => Err(e.into()),
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> impl IntoResponse {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Rejected(_) | SessionError::UnknownSuggestion(_) => {
                AppError::BadRequest(e.to_string())
            }
            SessionError::Closed => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
