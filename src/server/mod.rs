//! HTTP server
//!
//! hyper http1 accept loop, shared state and request routing.

pub mod http;

pub use http::{run, serve, AppState};
