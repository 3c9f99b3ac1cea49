//! Database layer for healthbot
//!
//! MongoDB persistence behind the [`HealthStore`] trait, with an in-memory
//! implementation for dev mode and tests.

pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use memory::InMemoryHealthStore;
pub use mongo::{redact_uri, MongoClient, MongoCollection};
pub use store::{HealthStore, MongoHealthStore};
