//! Database schemas for healthbot
//!
//! Defines MongoDB document structures for users, conversations, quizzes and quiz results.

mod conversation;
mod metadata;
mod quiz;
mod quiz_result;
mod user;

pub use conversation::{ConversationDoc, ReplySource, CONVERSATION_COLLECTION};
pub use metadata::{to_rfc3339, Metadata};
pub use quiz::{QuizDoc, QuizQuestion, QUIZ_COLLECTION};
pub use quiz_result::{QuizResultDoc, QUIZ_RESULT_COLLECTION};
pub use user::{PreferenceUpdate, UserDoc, DEFAULT_LANGUAGE, USER_COLLECTION};
