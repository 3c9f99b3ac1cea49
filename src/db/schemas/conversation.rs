//! Conversation document schema
//!
//! One record per chat exchange. Append-only.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, Stamp};

/// Collection name for conversations
pub const CONVERSATION_COLLECTION: &str = "conversations";

/// Which responder produced an answer
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    #[serde(alias = "rasa")]
    Classifier,
    #[serde(alias = "gemini", alias = "openrouter")]
    Llm,
    Fallback,
    Error,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Classifier => "classifier",
            ReplySource::Llm => "llm",
            ReplySource::Fallback => "fallback",
            ReplySource::Error => "error",
        }
    }
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConversationDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Anonymized user identifier, or `anonymous`
    pub user_id: String,

    pub message: String,
    pub response: String,
    pub language: String,
    pub source: ReplySource,
    pub timestamp: DateTime,
}

impl ConversationDoc {
    pub fn new(
        user_id: String,
        message: String,
        response: String,
        language: String,
        source: ReplySource,
    ) -> Self {
        Self {
            _id: None,
            user_id,
            message,
            response,
            language,
            source,
            timestamp: DateTime::now(),
        }
    }
}

impl IntoIndexes for ConversationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1, "timestamp": -1 },
            Some(
                IndexOptions::builder()
                    .name("user_id_timestamp".to_string())
                    .build(),
            ),
        )]
    }
}

impl Stamp for ConversationDoc {
    fn stamp(&mut self, now: DateTime) {
        self.timestamp = now;
    }
}
