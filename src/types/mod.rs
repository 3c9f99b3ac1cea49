//! Shared types

pub mod error;

pub use error::{HealthBotError, Result};
