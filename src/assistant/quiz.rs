//! Quiz scoring and badge tiers

use serde::Serialize;

use crate::types::{HealthBotError, Result};

/// Badge tiers, highest first: (minimum percentage, badge)
const BADGES: &[(u32, &str)] = &[
    (90, "Health Champion"),
    (80, "Health Hero"),
    (60, "Health Explorer"),
];

const LOWEST_BADGE: &str = "Health Learner";

/// Outcome of scoring one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizScore {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub badge: &'static str,
}

impl QuizScore {
    /// Congratulation text sent back to the user
    pub fn message(&self) -> String {
        format!(
            "Congratulations! You scored {}/{} and earned the '{}' badge!",
            self.score, self.total_questions, self.badge
        )
    }
}

/// Badge for `score` out of `total`, compared in integer arithmetic
fn badge_for(score: u32, total: u32) -> &'static str {
    let scaled = u64::from(score) * 100;
    BADGES
        .iter()
        .find(|(min, _)| scaled >= u64::from(*min) * u64::from(total))
        .map(|(_, badge)| *badge)
        .unwrap_or(LOWEST_BADGE)
}

fn same_answer(given: &str, expected: &str) -> bool {
    given.to_lowercase() == expected.to_lowercase()
}

/// Score answers against the correct answers, case-insensitively
pub fn score_quiz<A, C>(answers: &[A], correct: &[C]) -> Result<QuizScore>
where
    A: AsRef<str>,
    C: AsRef<str>,
{
    if correct.is_empty() {
        return Err(HealthBotError::BadRequest("Quiz has no questions".into()));
    }
    if answers.len() != correct.len() {
        return Err(HealthBotError::BadRequest(format!(
            "Invalid number of answers: expected {}, got {}",
            correct.len(),
            answers.len()
        )));
    }

    let score = answers
        .iter()
        .zip(correct)
        .filter(|(given, expected)| same_answer(given.as_ref(), expected.as_ref()))
        .count() as u32;
    let total = correct.len() as u32;

    Ok(QuizScore {
        score,
        total_questions: total,
        percentage: f64::from(score) * 100.0 / f64::from(total),
        badge: badge_for(score, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_with(correct: usize) -> (Vec<String>, Vec<&'static str>) {
        let expected = vec!["A"; 10];
        let answers = (0..10)
            .map(|i| if i < correct { "a".to_string() } else { "b".to_string() })
            .collect();
        (answers, expected)
    }

    #[test]
    fn test_badge_tiers() {
        let (answers, expected) = ten_with(9);
        let s = score_quiz(&answers, &expected).unwrap();
        assert_eq!(s.score, 9);
        assert_eq!(s.percentage, 90.0);
        assert_eq!(s.badge, "Health Champion");

        let (answers, expected) = ten_with(8);
        assert_eq!(score_quiz(&answers, &expected).unwrap().badge, "Health Hero");

        let (answers, expected) = ten_with(7);
        assert_eq!(score_quiz(&answers, &expected).unwrap().badge, "Health Explorer");

        let (answers, expected) = ten_with(5);
        assert_eq!(score_quiz(&answers, &expected).unwrap().badge, "Health Learner");
    }

    #[test]
    fn test_thresholds_exact_for_thirds() {
        // 2/3 = 66.7% -> Explorer, 3/3 -> Champion, 1/3 -> Learner
        let expected = ["x", "y", "z"];
        assert_eq!(score_quiz(&["x", "y", "q"], &expected).unwrap().badge, "Health Explorer");
        assert_eq!(score_quiz(&["X", "Y", "Z"], &expected).unwrap().badge, "Health Champion");
        assert_eq!(score_quiz(&["x", "q", "q"], &expected).unwrap().badge, "Health Learner");
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = score_quiz(&["a"], &["a", "b"]).unwrap_err();
        assert!(matches!(err, HealthBotError::BadRequest(_)));

        let empty: [&str; 0] = [];
        assert!(score_quiz(&empty, &empty).is_err());
    }

    #[test]
    fn test_message() {
        let s = score_quiz(&["a", "b"], &["a", "c"]).unwrap();
        assert_eq!(
            s.message(),
            "Congratulations! You scored 1/2 and earned the 'Health Learner' badge!"
        );
    }
}
