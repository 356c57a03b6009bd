//! Chat route handlers.
//!
//! Identifier strings are validated here, before they reach the services;
//! the core assumes every id it receives is well-formed.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use salto_core::DocumentId;

use crate::error::AppError;
use crate::middleware::Tenant;
use crate::models::{ChatSession, Message};
use crate::services::ChatService;
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat/sessions", get(list_sessions))
        .route("/chat/create", post(create_chat))
        .route("/chat/{chat_id}", delete(delete_chat))
        .route("/chat/{chat_id}/messages", get(get_messages))
        .route("/chat/{chat_id}/send", post(send_message))
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Chat session as listed.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub last_message_at: i64,
    pub instance_name: String,
}

impl From<ChatSession> for SessionResponse {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id.map(|id| id.to_string()).unwrap_or_default(),
            title: session.title,
            created_at: session.created_at,
            last_message_at: session.last_message_at,
            instance_name: session.instance_name,
        }
    }
}

/// Chat session as returned on creation.
#[derive(Debug, Serialize)]
pub struct CreatedSessionResponse {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub instance_name: String,
}

impl From<ChatSession> for CreatedSessionResponse {
    fn from(session: ChatSession) -> Self {
        Self {
            id: session.id.map(|id| id.to_string()).unwrap_or_default(),
            title: session.title,
            created_at: session.created_at,
            instance_name: session.instance_name,
        }
    }
}

/// Chat message representation.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: i64,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.map(|id| id.to_string()).unwrap_or_default(),
            role: message.role.as_str().to_string(),
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

/// Request to send a message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    success: bool,
}

/// Parse a path identifier, rejecting malformed values before the services.
fn parse_chat_id(chat_id: &str) -> Result<DocumentId, AppError> {
    DocumentId::parse(chat_id)
        .map_err(|_| AppError::BadRequest("Invalid chat ID format".to_string()))
}

// =============================================================================
// Route Handlers
// =============================================================================

/// List chat sessions for the ambient tenant, most recently active first.
///
/// GET /chat/sessions
async fn list_sessions(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    let service = ChatService::new(state.store(), state.gateway());
    let sessions = service.list_sessions(&instance_name).await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

/// Create a new chat session.
///
/// POST /chat/create
async fn create_chat(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
) -> Result<Json<CreatedSessionResponse>, AppError> {
    let service = ChatService::new(state.store(), state.gateway());
    let session = service.create_session(&instance_name).await?;
    Ok(Json(session.into()))
}

/// Delete a chat session and its messages.
///
/// DELETE /chat/{chat_id}
async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Response, AppError> {
    let chat_id = parse_chat_id(&chat_id)?;

    let service = ChatService::new(state.store(), state.gateway());
    if service.delete_session(chat_id).await? {
        Ok(Json(DeleteResponse { success: true }).into_response())
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to delete chat" })),
        )
            .into_response())
    }
}

/// List all messages of a chat session, oldest first.
///
/// GET /chat/{chat_id}/messages
async fn get_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let chat_id = parse_chat_id(&chat_id)?;

    let service = ChatService::new(state.store(), state.gateway());
    let messages = service.list_messages(chat_id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Send a message in a chat session and return the assistant's reply.
///
/// POST /chat/{chat_id}/send
async fn send_message(
    State(state): State<AppState>,
    Tenant(instance_name): Tenant,
    Path(chat_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let chat_id = parse_chat_id(&chat_id)?;

    let query = request
        .message
        .ok_or_else(|| AppError::BadRequest("Message content is required".to_string()))?;

    let service = ChatService::new(state.store(), state.gateway());
    let reply = service.process_query(chat_id, &query, &instance_name).await?;
    Ok(Json(reply.into()))
}
