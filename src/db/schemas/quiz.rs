//! Quiz document schema

use bson::{oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, Stamp};
use crate::db::schemas::Metadata;

/// Collection name for quizzes
pub const QUIZ_COLLECTION: &str = "quizzes";

/// A single multiple-choice question
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Quiz document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QuizDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub questions: Vec<QuizQuestion>,

    #[serde(default)]
    pub difficulty: String,

    #[serde(default)]
    pub category: String,
}

impl QuizDoc {
    /// Correct answers in question order
    pub fn correct_answers(&self) -> Vec<&str> {
        self.questions
            .iter()
            .map(|q| q.correct_answer.as_str())
            .collect()
    }

    /// Hex form of the document ID, empty if unsaved
    pub fn id_hex(&self) -> String {
        self._id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

impl IntoIndexes for QuizDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![]
    }
}

impl Stamp for QuizDoc {
    fn stamp(&mut self, now: DateTime) {
        if self.metadata.created_at.is_none() {
            self.metadata.created_at = Some(now);
        }
        self.metadata.updated_at = Some(now);
    }
}
