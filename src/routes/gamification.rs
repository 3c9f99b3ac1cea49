//! Quiz endpoints

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::gamification::{QuizOutcome, QuizSubmission, QuizSummary};
use crate::routes::response::{into_response, parse_json, FullBody};
use crate::server::AppState;
use crate::types::{HealthBotError, Result};

#[derive(Debug, Serialize)]
struct QuizList {
    quizzes: Vec<QuizSummary>,
}

/// GET /gamification/quizzes
pub async fn handle_list_quizzes(state: &AppState) -> Response<FullBody> {
    let result = state
        .gamification
        .quizzes()
        .await
        .map(|quizzes| QuizList { quizzes });
    into_response(StatusCode::OK, result)
}

async fn submit(state: &AppState, body: &[u8]) -> Result<QuizOutcome> {
    let submission: QuizSubmission = parse_json(body)?;
    if submission.user_id.trim().is_empty() || submission.quiz_id.trim().is_empty() {
        return Err(HealthBotError::BadRequest(
            "user_id and quiz_id are required".into(),
        ));
    }
    state.gamification.submit(submission).await
}

/// POST /gamification/quiz
pub async fn handle_submit_quiz(state: &AppState, body: &[u8]) -> Response<FullBody> {
    into_response(StatusCode::OK, submit(state, body).await)
}

/// GET /gamification/{user_id}/results
pub async fn handle_results(state: &AppState, user_id: &str) -> Response<FullBody> {
    into_response(StatusCode::OK, state.gamification.results(user_id).await)
}
