//! Quiz result document schema
//!
//! Append-only record of each scored submission.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, Stamp};

/// Collection name for quiz results
pub const QUIZ_RESULT_COLLECTION: &str = "quiz_results";

/// Quiz result document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuizResultDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Anonymized user identifier
    pub user_id: String,

    /// Hex ObjectId of the quiz
    pub quiz_id: String,

    pub score: i32,

    /// Absent on records written before the count was stored
    #[serde(default)]
    pub total_questions: i32,
    pub badge: String,
    pub timestamp: DateTime,
}

impl QuizResultDoc {
    pub fn new(
        user_id: String,
        quiz_id: String,
        score: i32,
        total_questions: i32,
        badge: String,
    ) -> Self {
        Self {
            _id: None,
            user_id,
            quiz_id,
            score,
            total_questions,
            badge,
            timestamp: DateTime::now(),
        }
    }
}

impl IntoIndexes for QuizResultDoc {
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

impl Stamp for QuizResultDoc {
    fn stamp(&mut self, now: DateTime) {
        self.timestamp = now;
    }
}
