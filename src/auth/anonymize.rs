//! User identifier anonymization
//!
//! Raw user identifiers never reach storage. Each one is replaced by
//! `hex(sha256(raw_id ++ salt))`.

use sha2::{Digest, Sha256};

/// Identifier recorded for exchanges without a user
pub const ANONYMOUS_USER: &str = "anonymous";

/// One-way salted hasher for user identifiers
#[derive(Clone)]
pub struct Anonymizer {
    salt: String,
}

impl Anonymizer {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hash a raw identifier
    pub fn anonymize(&self, raw_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(raw_id.as_bytes());
        hasher.update(self.salt.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Hash an optional identifier, falling back to [`ANONYMOUS_USER`]
    pub fn anonymize_or_anonymous(&self, raw_id: Option<&str>) -> String {
        match raw_id {
            Some(id) if !id.trim().is_empty() => self.anonymize(id),
            _ => ANONYMOUS_USER.to_string(),
        }
    }
}

impl std::fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anonymizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymize_matches_salted_sha256() {
        let anonymizer = Anonymizer::new("salt");
        let expected = hex::encode(Sha256::digest(b"user_001salt"));
        assert_eq!(anonymizer.anonymize("user_001"), expected);
        assert_eq!(anonymizer.anonymize("user_001").len(), 64);
    }

    #[test]
    fn test_salt_changes_output() {
        let a = Anonymizer::new("one").anonymize("user_001");
        let b = Anonymizer::new("two").anonymize("user_001");
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_id_is_anonymous() {
        let anonymizer = Anonymizer::new("salt");
        assert_eq!(anonymizer.anonymize_or_anonymous(None), ANONYMOUS_USER);
        assert_eq!(anonymizer.anonymize_or_anonymous(Some("  ")), ANONYMOUS_USER);
        assert_ne!(anonymizer.anonymize_or_anonymous(Some("abc")), ANONYMOUS_USER);
    }
}
