//! Persistence seam for users, conversations and quizzes
//!
//! Handlers and the responder chain only see [`HealthStore`]. Production
//! uses [`MongoHealthStore`]; dev mode and tests use the in-memory store.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use tracing::info;

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    ConversationDoc, PreferenceUpdate, QuizDoc, QuizResultDoc, UserDoc, CONVERSATION_COLLECTION,
    QUIZ_COLLECTION, QUIZ_RESULT_COLLECTION, USER_COLLECTION,
};
use crate::types::Result;

/// Storage operations used by the service
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Short name of the backend, reported by `/health`
    fn kind(&self) -> &'static str;

    /// Insert a new user; `Conflict` if the id or phone is taken
    async fn insert_user(&self, user: UserDoc) -> Result<()>;

    async fn find_user(&self, user_id: &str) -> Result<Option<UserDoc>>;

    /// Apply a partial preference update. Returns false if no user matched.
    async fn update_user_preferences(&self, user_id: &str, update: &PreferenceUpdate)
        -> Result<bool>;

    async fn insert_conversation(&self, conversation: ConversationDoc) -> Result<()>;

    /// Most recent exchanges for a user, newest first
    async fn conversation_history(&self, user_id: &str, limit: i64)
        -> Result<Vec<ConversationDoc>>;

    async fn list_quizzes(&self, limit: i64) -> Result<Vec<QuizDoc>>;

    /// Look up a quiz by hex ObjectId. Malformed ids are treated as missing.
    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<QuizDoc>>;

    async fn insert_quiz(&self, quiz: QuizDoc) -> Result<ObjectId>;

    async fn insert_quiz_result(&self, result: QuizResultDoc) -> Result<()>;

    /// Most recent quiz results for a user, newest first
    async fn quiz_results(&self, user_id: &str, limit: i64) -> Result<Vec<QuizResultDoc>>;

    /// Release backend resources
    async fn shutdown(&self);
}

/// MongoDB-backed store
pub struct MongoHealthStore {
    client: MongoClient,
    users: MongoCollection<UserDoc>,
    conversations: MongoCollection<ConversationDoc>,
    quizzes: MongoCollection<QuizDoc>,
    quiz_results: MongoCollection<QuizResultDoc>,
}

impl MongoHealthStore {
    /// Open all collections and apply their indexes
    pub async fn new(client: MongoClient) -> Result<Self> {
        let users = client.collection::<UserDoc>(USER_COLLECTION).await?;
        let conversations = client
            .collection::<ConversationDoc>(CONVERSATION_COLLECTION)
            .await?;
        let quizzes = client.collection::<QuizDoc>(QUIZ_COLLECTION).await?;
        let quiz_results = client
            .collection::<QuizResultDoc>(QUIZ_RESULT_COLLECTION)
            .await?;

        info!(db = client.db_name(), "MongoDB collections ready");

        Ok(Self {
            client,
            users,
            conversations,
            quizzes,
            quiz_results,
        })
    }
}

#[async_trait]
impl HealthStore for MongoHealthStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn insert_user(&self, user: UserDoc) -> Result<()> {
        self.users.insert_one(user).await?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "user_id": user_id }).await
    }

    async fn update_user_preferences(
        &self,
        user_id: &str,
        update: &PreferenceUpdate,
    ) -> Result<bool> {
        let set = update.to_set_document(DateTime::now());
        let result = self
            .users
            .update_one(doc! { "user_id": user_id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn insert_conversation(&self, conversation: ConversationDoc) -> Result<()> {
        self.conversations.insert_one(conversation).await?;
        Ok(())
    }

    async fn conversation_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationDoc>> {
        self.conversations
            .find_many(
                doc! { "user_id": user_id },
                Some(doc! { "timestamp": -1 }),
                Some(limit),
            )
            .await
    }

    async fn list_quizzes(&self, limit: i64) -> Result<Vec<QuizDoc>> {
        self.quizzes.find_many(doc! {}, None, Some(limit)).await
    }

    async fn find_quiz(&self, quiz_id: &str) -> Result<Option<QuizDoc>> {
        let Ok(oid) = ObjectId::parse_str(quiz_id) else {
            return Ok(None);
        };
        self.quizzes.find_one(doc! { "_id": oid }).await
    }

    async fn insert_quiz(&self, quiz: QuizDoc) -> Result<ObjectId> {
        self.quizzes.insert_one(quiz).await
    }

    async fn insert_quiz_result(&self, result: QuizResultDoc) -> Result<()> {
        self.quiz_results.insert_one(result).await?;
        Ok(())
    }

    async fn quiz_results(&self, user_id: &str, limit: i64) -> Result<Vec<QuizResultDoc>> {
        self.quiz_results
            .find_many(
                doc! { "user_id": user_id },
                Some(doc! { "timestamp": -1 }),
                Some(limit),
            )
            .await
    }

    async fn shutdown(&self) {
        info!("Closing MongoDB connections");
        self.client.clone().shutdown().await;
    }
}
