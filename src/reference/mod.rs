//! Static reference data
//!
//! Disease information and vaccination schedules (file cached), outbreak
//! alerts and the built-in quiz set.

pub mod alerts;
pub mod cache;
pub mod quizzes;

pub use alerts::outbreak_alerts;
pub use cache::{DiseaseInfo, ReferenceCache};
pub use quizzes::{default_quizzes, seed_quizzes};
