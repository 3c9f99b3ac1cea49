//! Built-in health quizzes

use tracing::info;

use crate::db::schemas::{QuizDoc, QuizQuestion};
use crate::db::HealthStore;
use crate::types::Result;

fn question(text: &str, options: &[&str], correct: &str) -> QuizQuestion {
    QuizQuestion {
        question: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
    }
}

/// Quizzes loaded into a fresh database
pub fn default_quizzes() -> Vec<QuizDoc> {
    vec![
        QuizDoc {
            title: "General Health Knowledge".to_string(),
            description: "Test your general health knowledge".to_string(),
            questions: vec![
                question(
                    "What is the primary symptom of dengue fever?",
                    &[
                        "High fever and severe headache",
                        "Cough and cold",
                        "Joint pain and swelling",
                        "Skin rashes only",
                    ],
                    "High fever and severe headache",
                ),
                question(
                    "How can malaria be prevented?",
                    &[
                        "Using mosquito nets",
                        "Drinking boiled water",
                        "Washing hands regularly",
                        "Avoiding crowded places",
                    ],
                    "Using mosquito nets",
                ),
                question(
                    "At what age should a child receive the measles vaccine?",
                    &["At birth", "6 months", "9 months", "1 year"],
                    "9 months",
                ),
            ],
            difficulty: "easy".to_string(),
            category: "general_health".to_string(),
            ..Default::default()
        },
        QuizDoc {
            title: "Nutrition Knowledge".to_string(),
            description: "Test your nutrition knowledge".to_string(),
            questions: vec![
                question(
                    "Which vitamin is essential for strong bones?",
                    &["Vitamin A", "Vitamin C", "Vitamin D", "Vitamin K"],
                    "Vitamin D",
                ),
                question(
                    "What is the main source of protein for vegetarians?",
                    &["Rice", "Lentils and pulses", "Vegetables", "Fruits"],
                    "Lentils and pulses",
                ),
            ],
            difficulty: "medium".to_string(),
            category: "nutrition".to_string(),
            ..Default::default()
        },
    ]
}

/// Insert the default quizzes into a store
pub async fn seed_quizzes(store: &dyn HealthStore) -> Result<usize> {
    let quizzes = default_quizzes();
    let count = quizzes.len();
    for quiz in quizzes {
        let id = store.insert_quiz(quiz).await?;
        info!(quiz_id = %id, "Seeded quiz");
    }
    Ok(count)
}
