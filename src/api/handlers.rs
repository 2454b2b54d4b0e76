//! HTTP request handlers

use super::assets::serve_static;
use super::templates::{ChatPage, HtmlTemplate, MessageFragment};
use super::types::{ChatRequest, ErrorResponse};
use super::AppState;
use crate::exchange::{BOT_RESPONSE_PATH, SHOW_MY_MESSAGE_PATH};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat page
        .route("/", get(chat_page))
        // Plain text chat without fragments
        .route("/chat", post(chat))
        // htmx fragment endpoints
        .route(SHOW_MY_MESSAGE_PATH, post(show_my_message))
        .route(BOT_RESPONSE_PATH, post(get_bot_response))
        // Static assets (embedded or filesystem fallback)
        .route("/static/*path", get(serve_static))
        // Version
        .route("/version", get(get_version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn chat_page(State(state): State<AppState>) -> HtmlTemplate<ChatPage> {
    HtmlTemplate(ChatPage {
        model: state.bot.model_id().to_string(),
    })
}

// ============================================================
// Chat
// ============================================================

async fn chat(State(state): State<AppState>, message: String) -> Response {
    match state.bot.reply(&message).await {
        Ok(reply) => (StatusCode::OK, reply).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.message).into_response(),
    }
}

/// Render the user's own message
async fn show_my_message(body: String) -> Result<HtmlTemplate<MessageFragment>, AppError> {
    let request = parse_chat_request(&body)?;
    Ok(HtmlTemplate(MessageFragment::from_me(
        request.message,
        Local::now(),
    )))
}

/// Ask the bot and render its reply
async fn get_bot_response(
    State(state): State<AppState>,
    body: String,
) -> Result<HtmlTemplate<MessageFragment>, AppError> {
    let request = parse_chat_request(&body)?;

    let reply = state
        .bot
        .reply(&request.message)
        .await
        .map_err(|e| AppError::Internal(e.message))?;

    Ok(HtmlTemplate(MessageFragment::from_bot(reply, Local::now())))
}

/// Bodies arrive JSON encoded from htmx's `json-enc`, whatever the content type
fn parse_chat_request(body: &str) -> Result<ChatRequest, AppError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting malformed chat request");
        AppError::BadRequest(format!("Invalid chat request: {e}"))
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("chatge ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
