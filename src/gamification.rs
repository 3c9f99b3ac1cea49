//! Quiz submission flow
//!
//! Loads the quiz, scores the answers, records the result and, when the
//! user has a phone on file, pushes the badge message to them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::assistant::score_quiz;
use crate::auth::Anonymizer;
use crate::config::NotifyChannel;
use crate::db::schemas::{to_rfc3339, QuizDoc, QuizResultDoc, DEFAULT_LANGUAGE};
use crate::db::HealthStore;
use crate::services::{needs_translation, Notifier, Translator};
use crate::types::{HealthBotError, Result};

/// Most quizzes returned by a listing
pub const QUIZ_LIST_LIMIT: i64 = 20;

/// Most results returned for a user
pub const RESULT_LIST_LIMIT: i64 = 50;

/// A user's answers to one quiz
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmission {
    pub user_id: String,
    pub quiz_id: String,
    pub answers: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Scored submission returned to the client
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuizOutcome {
    pub quiz_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub badge: String,
    pub message: String,
}

/// Public view of a quiz (answers withheld)
#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub category: String,
    pub questions: Vec<QuestionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub question: String,
    pub options: Vec<String>,
}

impl From<QuizDoc> for QuizSummary {
    fn from(quiz: QuizDoc) -> Self {
        Self {
            id: quiz.id_hex(),
            title: quiz.title,
            description: quiz.description,
            difficulty: quiz.difficulty,
            category: quiz.category,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| QuestionSummary {
                    question: q.question,
                    options: q.options,
                })
                .collect(),
        }
    }
}

/// Stored result as returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub quiz_id: String,
    pub score: i32,
    pub total_questions: i32,
    pub badge: String,
    pub timestamp: String,
}

impl From<QuizResultDoc> for ResultSummary {
    fn from(doc: QuizResultDoc) -> Self {
        Self {
            quiz_id: doc.quiz_id,
            score: doc.score,
            total_questions: doc.total_questions,
            badge: doc.badge,
            timestamp: to_rfc3339(doc.timestamp),
        }
    }
}

/// Quiz results for one anonymized user
#[derive(Debug, Clone, Serialize)]
pub struct UserResults {
    pub user_id: String,
    pub results: Vec<ResultSummary>,
}

/// Quiz scoring, persistence and notification
pub struct GamificationService {
    store: Arc<dyn HealthStore>,
    translator: Arc<dyn Translator>,
    notifier: Arc<dyn Notifier>,
    channel: NotifyChannel,
    anonymizer: Anonymizer,
}

impl GamificationService {
    pub fn new(
        store: Arc<dyn HealthStore>,
        translator: Arc<dyn Translator>,
        notifier: Arc<dyn Notifier>,
        channel: NotifyChannel,
        anonymizer: Anonymizer,
    ) -> Self {
        Self {
            store,
            translator,
            notifier,
            channel,
            anonymizer,
        }
    }

    /// Score a submission. Nothing is stored when the quiz is missing or the
    /// answer count is wrong.
    pub async fn submit(&self, submission: QuizSubmission) -> Result<QuizOutcome> {
        let anon_id = self.anonymizer.anonymize(&submission.user_id);

        let quiz = self
            .store
            .find_quiz(&submission.quiz_id)
            .await?
            .ok_or_else(|| {
                HealthBotError::NotFound(format!("Quiz {} not found", submission.quiz_id))
            })?;

        let score = score_quiz(&submission.answers, &quiz.correct_answers())?;

        self.store
            .insert_quiz_result(QuizResultDoc::new(
                anon_id.clone(),
                submission.quiz_id.clone(),
                score.score as i32,
                score.total_questions as i32,
                score.badge.to_string(),
            ))
            .await?;
        info!(
            user = %anon_id,
            quiz_id = %submission.quiz_id,
            score = score.score,
            badge = score.badge,
            "Saved quiz result"
        );

        let mut message = score.message();
        if needs_translation(&submission.language) {
            message = self
                .translator
                .translate(&message, "en", &submission.language)
                .await;
        }

        self.notify(&anon_id, &message).await;

        Ok(QuizOutcome {
            quiz_id: submission.quiz_id,
            score: score.score,
            total_questions: score.total_questions,
            percentage: score.percentage,
            badge: score.badge.to_string(),
            message,
        })
    }

    /// Best-effort badge notification to the user's phone
    async fn notify(&self, anon_id: &str, message: &str) {
        let phone = match self.store.find_user(anon_id).await {
            Ok(Some(user)) => user.phone,
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, user = %anon_id, "User lookup for notification failed");
                None
            }
        };

        let Some(phone) = phone else {
            return;
        };

        if let Err(e) = self.notifier.send(self.channel, &phone, message).await {
            warn!(error = %e, user = %anon_id, "Badge notification failed");
        }
    }

    /// Recent results for a raw user id; `NotFound` when there are none
    pub async fn results(&self, user_id: &str) -> Result<UserResults> {
        let anon_id = self.anonymizer.anonymize(user_id);
        let results = self.store.quiz_results(&anon_id, RESULT_LIST_LIMIT).await?;
        if results.is_empty() {
            return Err(HealthBotError::NotFound("No quiz results found".into()));
        }
        Ok(UserResults {
            user_id: anon_id,
            results: results.into_iter().map(ResultSummary::from).collect(),
        })
    }

    /// Available quizzes
    pub async fn quizzes(&self) -> Result<Vec<QuizSummary>> {
        let quizzes = self.store.list_quizzes(QUIZ_LIST_LIMIT).await?;
        Ok(quizzes.into_iter().map(QuizSummary::from).collect())
    }
}
