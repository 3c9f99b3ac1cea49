//! User document schema
//!
//! Profiles keyed by the anonymized user identifier.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, Stamp};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// Language used when a client does not send one
pub const DEFAULT_LANGUAGE: &str = "en-IN";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Anonymized user identifier
    pub user_id: String,

    /// Home district
    pub district: String,

    /// Preferred language code (e.g. en-IN, or-IN, hi-IN)
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,

    /// Phone number for WhatsApp/SMS notifications.
    /// Omitted rather than null so the sparse unique index ignores it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Whether the user opted into outbreak alerts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_alerts: Option<bool>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl UserDoc {
    /// Create a new user document
    pub fn new(
        user_id: String,
        district: String,
        language: String,
        age: Option<i32>,
        phone: Option<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user_id,
            district,
            language,
            age,
            phone,
            receive_alerts: None,
        }
    }
}

/// Partial preference update; unset fields are left untouched
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PreferenceUpdate {
    pub district: Option<String>,
    pub language: Option<String>,
    pub receive_alerts: Option<bool>,
}

impl PreferenceUpdate {
    /// Build the `$set` document for this update
    pub fn to_set_document(&self, now: DateTime) -> Document {
        let mut set = doc! { "metadata.updated_at": now };
        if let Some(ref district) = self.district {
            set.insert("district", district.clone());
        }
        if let Some(ref language) = self.language {
            set.insert("language", language.clone());
        }
        if let Some(receive_alerts) = self.receive_alerts {
            set.insert("receive_alerts", receive_alerts);
        }
        set
    }

    /// Apply this update to an in-memory document
    pub fn apply(&self, user: &mut UserDoc, now: DateTime) {
        if let Some(ref district) = self.district {
            user.district = district.clone();
        }
        if let Some(ref language) = self.language {
            user.language = language.clone();
        }
        if let Some(receive_alerts) = self.receive_alerts {
            user.receive_alerts = Some(receive_alerts);
        }
        user.metadata.updated_at = Some(now);
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on anonymized identifier
            (
                doc! { "user_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_id_unique".to_string())
                        .build(),
                ),
            ),
            // Phone is optional but must not be shared between users
            (
                doc! { "phone": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .sparse(true)
                        .name("phone_unique_sparse".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl Stamp for UserDoc {
    fn stamp(&mut self, now: DateTime) {
        if self.metadata.created_at.is_none() {
            self.metadata.created_at = Some(now);
        }
        self.metadata.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_phone_is_not_serialized() {
        let user = UserDoc::new(
            "abc".into(),
            "Cuttack".into(),
            DEFAULT_LANGUAGE.into(),
            None,
            None,
        );
        let doc = bson::to_document(&user).unwrap();
        assert!(!doc.contains_key("phone"));
        assert!(!doc.contains_key("age"));
        assert_eq!(doc.get_str("user_id").unwrap(), "abc");
    }

    #[test]
    fn test_preference_update_only_sets_given_fields() {
        let update = PreferenceUpdate {
            language: Some("or-IN".into()),
            ..Default::default()
        };
        let set = update.to_set_document(DateTime::now());
        assert_eq!(set.get_str("language").unwrap(), "or-IN");
        assert!(!set.contains_key("district"));
        assert!(set.contains_key("metadata.updated_at"));

        let mut user = UserDoc::new(
            "abc".into(),
            "Puri".into(),
            DEFAULT_LANGUAGE.into(),
            Some(30),
            None,
        );
        update.apply(&mut user, DateTime::now());
        assert_eq!(user.language, "or-IN");
        assert_eq!(user.district, "Puri");
    }
}
