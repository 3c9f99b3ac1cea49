//! User identity handling
//!
//! Only anonymization lives here; authentication is handled upstream.

pub mod anonymize;

pub use anonymize::{Anonymizer, ANONYMOUS_USER};
