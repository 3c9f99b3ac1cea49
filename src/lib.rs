//! Healthbot - regional health assistant backend
//!
//! Answers free-text health questions through an ordered responder chain
//! (intent classifier, hosted LLM, keyword fallback) and serves reference
//! data, user profiles and quiz gamification over a JSON HTTP API.
//!
//! ## Components
//!
//! - **Assistant**: responder chain, keyword fallback, symptom advice, quiz scoring
//! - **Services**: classifier, LLM, translation, messaging and TTS clients
//! - **Reference**: disease info and vaccination cache files, outbreak alerts
//! - **Gamification**: quiz submission, results and badge notifications
//! - **DB**: MongoDB persistence behind `HealthStore`, with an in-memory store

pub mod assistant;
pub mod auth;
pub mod config;
pub mod db;
pub mod gamification;
pub mod reference;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, serve, AppState};
pub use types::{HealthBotError, Result};
