//! Chat endpoints
//!
//! - POST /chat - Run a message through the responder chain
//! - GET /chat/{user_id}/history - Recent exchanges for a user

use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::assistant::ChatReply;
use crate::db::schemas::{to_rfc3339, ConversationDoc, ReplySource, DEFAULT_LANGUAGE};
use crate::routes::response::{into_response, parse_json, parse_query, FullBody};
use crate::server::AppState;
use crate::types::{HealthBotError, Result};

/// Default and maximum history page sizes
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Deserialize, Default)]
struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub message: String,
    pub response: String,
    pub language: String,
    pub source: ReplySource,
    pub timestamp: String,
}

impl From<ConversationDoc> for HistoryEntry {
    fn from(doc: ConversationDoc) -> Self {
        Self {
            message: doc.message,
            response: doc.response,
            language: doc.language,
            source: doc.source,
            timestamp: to_rfc3339(doc.timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub history: Vec<HistoryEntry>,
}

async fn chat(state: &AppState, body: &[u8]) -> Result<ChatReply> {
    let request: ChatRequest = parse_json(body)?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(HealthBotError::BadRequest("message is required".into()));
    }
    Ok(state
        .chain
        .respond(message, request.user_id.as_deref(), &request.language)
        .await)
}

/// POST /chat
pub async fn handle_chat(state: &AppState, body: &[u8]) -> Response<FullBody> {
    into_response(StatusCode::OK, chat(state, body).await)
}

async fn history(state: &AppState, user_id: &str, query: Option<&str>) -> Result<HistoryResponse> {
    let params: HistoryQuery = parse_query(query)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let anon_id = state.anonymizer.anonymize(user_id);
    let history = state.store.conversation_history(&anon_id, limit).await?;
    Ok(HistoryResponse {
        user_id: anon_id,
        history: history.into_iter().map(HistoryEntry::from).collect(),
    })
}

/// GET /chat/{user_id}/history?limit=
pub async fn handle_history(
    state: &AppState,
    user_id: &str,
    query: Option<&str>,
) -> Response<FullBody> {
    into_response(StatusCode::OK, history(state, user_id, query).await)
}
