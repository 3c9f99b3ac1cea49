//! In-memory store
//!
//! Used in dev mode when MongoDB is unreachable, and by tests.

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use dashmap::DashMap;

use crate::db::schemas::{ConversationDoc, PreferenceUpdate, QuizDoc, QuizResultDoc, UserDoc};
use crate::db::store::HealthStore;
use crate::types::{HealthBotError, Result};

/// DashMap-backed [`HealthStore`]
#[derive(Default)]
pub struct InMemoryHealthStore {
    users: DashMap<String, UserDoc>,
    conversations: DashMap<String, Vec<ConversationDoc>>,
    quizzes: DashMap<ObjectId, QuizDoc>,
    quiz_results: DashMap<String, Vec<QuizResultDoc>>,
}

impl InMemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored conversations across all users
    pub fn conversation_count(&self) -> usize {
        self.conversations.iter().map(|e| e.value().len()).sum()
    }

    /// Total stored quiz results across all users
    pub fn quiz_result_count(&self) -> usize {
        self.quiz_results.iter().map(|e| e.value().len()).sum()
    }
}

fn newest_first<T: Clone>(items: &[T], limit: i64) -> Vec<T> {
    let limit = usize::try_from(limit).unwrap_or(0);
    items.iter().rev().take(limit).cloned().collect()
}

#[async_trait]
impl HealthStore for InMemoryHealthStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, mut user: UserDoc) -> Result<()> {
        if let Some(ref phone) = user.phone {
            let taken = self
                .users
                .iter()
                .any(|e| e.value().phone.as_deref() == Some(phone.as_str()));
            if taken {
                return Err(HealthBotError::Conflict("Document already exists".into()));
            }
        }

        match self.users.entry(user.user_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(HealthBotError::Conflict("Document already exists".into()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let now = DateTime::now();
                user._id = Some(ObjectId::new());
                user.metadata.created_at = Some(now);
                user.metadata.updated_at = Some(now);
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserDoc>> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn update_user_preferences(
        &self,
        user_id: &str,
        update: &PreferenceUpdate,
    ) -> Result<bool> {
        match self.users.get_mut(user_id) {
            Some(mut user) => {
                update.apply(user.value_mut(), DateTime::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_conversation(&self, mut conversation: ConversationDoc) -> Result<()> {
        conversation._id = Some(ObjectId::new());
        conversation.timestamp = DateTime::now();
        self.conversations
            .entry(conversation.user_id.clone())
            .or_default()
            .push(conversation);
        Ok(())
    }

    async fn conversation_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationDoc>> {
        Ok(self
            .conversations
            .get(user_id)
            .map(|items| newest_first(items.value(), limit))
            .unwrap_or_default())
    }

    async fn list_quizzes(&self, limit: i64) -> Result<Vec<QuizDoc>> {
        let mut quizzes: Vec<QuizDoc> = self.quizzes.iter().map(|e| e.value().clone()).collect();
        quizzes.sort_by_key(|q| q._id);
        quizzes.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(quizzes)
    }

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<QuizDoc>> {
        let Ok(oid) = ObjectId::parse_str(quiz_id) else {
            return Ok(None);
        };
        Ok(self.quizzes.get(&oid).map(|q| q.value().clone()))
    }

    async fn insert_quiz(&self, mut quiz: QuizDoc) -> Result<ObjectId> {
        let oid = quiz._id.unwrap_or_else(ObjectId::new);
        quiz._id = Some(oid);
        if quiz.metadata.created_at.is_none() {
            quiz.metadata.created_at = Some(DateTime::now());
        }
        self.quizzes.insert(oid, quiz);
        Ok(oid)
    }

    async fn insert_quiz_result(&self, mut result: QuizResultDoc) -> Result<()> {
        result._id = Some(ObjectId::new());
        result.timestamp = DateTime::now();
        self.quiz_results
            .entry(result.user_id.clone())
            .or_default()
            .push(result);
        Ok(())
    }

    async fn quiz_results(&self, user_id: &str, limit: i64) -> Result<Vec<QuizResultDoc>> {
        Ok(self
            .quiz_results
            .get(user_id)
            .map(|items| newest_first(items.value(), limit))
            .unwrap_or_default())
    }

    async fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{QuizQuestion, ReplySource, DEFAULT_LANGUAGE};

    fn user(id: &str, phone: Option<&str>) -> UserDoc {
        UserDoc::new(
            id.into(),
            "Khordha".into(),
            DEFAULT_LANGUAGE.into(),
            None,
            phone.map(String::from),
        )
    }

    #[tokio::test]
    async fn test_duplicate_user_conflicts() {
        let store = InMemoryHealthStore::new();
        store.insert_user(user("a", Some("+911"))).await.unwrap();

        let err = store.insert_user(user("a", None)).await.unwrap_err();
        assert!(matches!(err, HealthBotError::Conflict(_)));

        let err = store.insert_user(user("b", Some("+911"))).await.unwrap_err();
        assert!(matches!(err, HealthBotError::Conflict(_)));

        // Users without a phone never collide on it
        store.insert_user(user("c", None)).await.unwrap();
        store.insert_user(user("d", None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_preferences_reports_match() {
        let store = InMemoryHealthStore::new();
        store.insert_user(user("a", None)).await.unwrap();

        let update = PreferenceUpdate {
            district: Some("Ganjam".into()),
            ..Default::default()
        };
        assert!(store.update_user_preferences("a", &update).await.unwrap());
        assert!(!store.update_user_preferences("zz", &update).await.unwrap());

        // Same values again still count as found
        assert!(store.update_user_preferences("a", &update).await.unwrap());
        let found = store.find_user("a").await.unwrap().unwrap();
        assert_eq!(found.district, "Ganjam");
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() {
        let store = InMemoryHealthStore::new();
        for i in 0..5 {
            store
                .insert_conversation(ConversationDoc::new(
                    "u".into(),
                    format!("m{}", i),
                    "r".into(),
                    DEFAULT_LANGUAGE.into(),
                    ReplySource::Fallback,
                ))
                .await
                .unwrap();
        }

        let history = store.conversation_history("u", 3).await.unwrap();
        let messages: Vec<&str> = history.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["m4", "m3", "m2"]);
        assert!(store.conversation_history("other", 3).await.unwrap().is_empty());
        assert_eq!(store.conversation_count(), 5);
    }

    #[tokio::test]
    async fn test_quiz_lookup_by_hex_id() {
        let store = InMemoryHealthStore::new();
        let quiz = QuizDoc {
            title: "Basics".into(),
            questions: vec![QuizQuestion {
                question: "q".into(),
                options: vec!["a".into(), "b".into()],
                correct_answer: "a".into(),
            }],
            ..Default::default()
        };
        let oid = store.insert_quiz(quiz).await.unwrap();

        let found = store.find_quiz(&oid.to_hex()).await.unwrap().unwrap();
        assert_eq!(found.title, "Basics");
        assert!(store.find_quiz("not-an-object-id").await.unwrap().is_none());
        assert_eq!(store.list_quizzes(20).await.unwrap().len(), 1);
    }
}
