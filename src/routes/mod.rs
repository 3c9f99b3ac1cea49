//! HTTP route handlers
//!
//! Handlers receive the shared state plus the already-collected body and
//! return complete responses; routing lives in `server::http`.

pub mod assistant;
pub mod chat;
pub mod gamification;
pub mod health;
pub mod health_info;
pub mod response;
pub mod tts;
pub mod users;

pub use assistant::{
    handle_emergency_check, handle_next_steps, handle_prevention_tips, handle_symptom_advice,
};
pub use chat::{handle_chat, handle_history};
pub use gamification::{handle_list_quizzes, handle_results, handle_submit_quiz};
pub use health::{health_check, version_info, HealthResponse};
pub use health_info::{handle_disease_info, handle_outbreak_alerts, handle_vaccination_schedule};
pub use response::{error_response, json_response, FullBody, MAX_BODY_BYTES};
pub use tts::handle_tts;
pub use users::{handle_create_user, handle_get_user, handle_update_preferences};
