//! Conversational core
//!
//! The responder chain with its rule-based fallback, the symptom advice
//! generator and quiz scoring. Nothing here touches HTTP.

pub mod chain;
pub mod fallback;
pub mod quiz;
pub mod symptoms;

pub use chain::{ChatReply, LlmSettings, ResponderChain, ResponseSource, APOLOGY};
pub use fallback::FallbackResponder;
pub use quiz::{score_quiz, QuizScore};
pub use symptoms::{SymptomQuery, Urgency};
