//! Responder chain
//!
//! Sources are tried in priority order and the first one that accepts the
//! message wins. The exchange is then translated if needed and persisted
//! best-effort. [`ResponderChain::respond`] never fails.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::assistant::fallback::FallbackResponder;
use crate::auth::Anonymizer;
use crate::db::schemas::{ConversationDoc, ReplySource};
use crate::db::HealthStore;
use crate::services::{
    needs_translation, system_prompt, CompletionRequest, IntentClassifier, LlmBackend, Translator,
};

/// Reply sent when no source could answer
pub const APOLOGY: &str = "I apologize, but I'm experiencing technical difficulties. Please try again later or contact your local health center for immediate assistance.";

/// Classifier intents that are never accepted
const REJECTED_INTENTS: &[&str] = &["out_of_scope", "nlu_fallback"];

/// A source passed on the message
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Declined(pub String);

/// One responder in the chain
#[async_trait]
pub trait ResponseSource: Send + Sync {
    fn source(&self) -> ReplySource;

    async fn answer(&self, message: &str) -> Result<String, Declined>;
}

/// Accepts confident, in-scope classifier replies
pub struct ClassifierSource {
    classifier: Arc<dyn IntentClassifier>,
    min_confidence: f64,
}

impl ClassifierSource {
    pub fn new(classifier: Arc<dyn IntentClassifier>, min_confidence: f64) -> Self {
        Self {
            classifier,
            min_confidence,
        }
    }
}

#[async_trait]
impl ResponseSource for ClassifierSource {
    fn source(&self) -> ReplySource {
        ReplySource::Classifier
    }

    async fn answer(&self, message: &str) -> Result<String, Declined> {
        let reply = self
            .classifier
            .classify(message)
            .await
            .map_err(|e| Declined(e.to_string()))?;

        if reply.confidence < self.min_confidence {
            return Err(Declined(format!("confidence {:.2} too low", reply.confidence)));
        }
        if let Some(intent) = reply.intent.as_deref() {
            if REJECTED_INTENTS.contains(&intent) {
                return Err(Declined(format!("intent {} rejected", intent)));
            }
        }
        Ok(reply.text)
    }
}

/// Generation settings for [`LlmSource`]
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub region: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Asks the hosted LLM with a region-scoped prompt
pub struct LlmSource {
    backend: Arc<dyn LlmBackend>,
    settings: LlmSettings,
}

impl LlmSource {
    pub fn new(backend: Arc<dyn LlmBackend>, settings: LlmSettings) -> Self {
        Self { backend, settings }
    }
}

#[async_trait]
impl ResponseSource for LlmSource {
    fn source(&self) -> ReplySource {
        ReplySource::Llm
    }

    async fn answer(&self, message: &str) -> Result<String, Declined> {
        let request = CompletionRequest::user(format!(
            "As a health assistant for {}, answer: {}",
            self.settings.region, message
        ))
        .with_system(system_prompt(&self.settings.region))
        .with_max_tokens(self.settings.max_tokens)
        .with_temperature(self.settings.temperature);

        let text = self
            .backend
            .complete(request)
            .await
            .map_err(|e| Declined(format!("{}: {}", self.backend.id(), e)))?;

        if text.is_empty() {
            return Err(Declined(format!("{}: empty completion", self.backend.id())));
        }
        Ok(text)
    }
}

/// Keyword responder; always answers
pub struct FallbackSource {
    responder: FallbackResponder,
}

impl FallbackSource {
    pub fn new(responder: FallbackResponder) -> Self {
        Self { responder }
    }
}

#[async_trait]
impl ResponseSource for FallbackSource {
    fn source(&self) -> ReplySource {
        ReplySource::Fallback
    }

    async fn answer(&self, message: &str) -> Result<String, Declined> {
        Ok(self.responder.respond(message).to_string())
    }
}

/// Answer returned to the client
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub language: String,
    pub source: ReplySource,
}

/// Ordered list of response sources plus the side-effects around them
pub struct ResponderChain {
    sources: Vec<Box<dyn ResponseSource>>,
    store: Arc<dyn HealthStore>,
    translator: Arc<dyn Translator>,
    anonymizer: Anonymizer,
}

impl ResponderChain {
    pub fn new(
        sources: Vec<Box<dyn ResponseSource>>,
        store: Arc<dyn HealthStore>,
        translator: Arc<dyn Translator>,
        anonymizer: Anonymizer,
    ) -> Self {
        Self {
            sources,
            store,
            translator,
            anonymizer,
        }
    }

    /// Classifier, then LLM, then keyword fallback
    #[allow(clippy::too_many_arguments)]
    pub fn standard(
        classifier: Arc<dyn IntentClassifier>,
        min_confidence: f64,
        llm: Arc<dyn LlmBackend>,
        llm_settings: LlmSettings,
        fallback: FallbackResponder,
        store: Arc<dyn HealthStore>,
        translator: Arc<dyn Translator>,
        anonymizer: Anonymizer,
    ) -> Self {
        let sources: Vec<Box<dyn ResponseSource>> = vec![
            Box::new(ClassifierSource::new(classifier, min_confidence)),
            Box::new(LlmSource::new(llm, llm_settings)),
            Box::new(FallbackSource::new(fallback)),
        ];
        Self::new(sources, store, translator, anonymizer)
    }

    /// Produce a reply for a message
    pub async fn respond(&self, message: &str, user_id: Option<&str>, language: &str) -> ChatReply {
        let anon_id = self.anonymizer.anonymize_or_anonymous(user_id);

        let Some((text, source)) = self.first_answer(message).await else {
            warn!(user = %anon_id, "No response source answered");
            return ChatReply {
                response: APOLOGY.to_string(),
                language: language.to_string(),
                source: ReplySource::Error,
            };
        };

        let response = if needs_translation(language) {
            self.translator.translate(&text, "en", language).await
        } else {
            text
        };

        let record = ConversationDoc::new(
            anon_id.clone(),
            message.to_string(),
            response.clone(),
            language.to_string(),
            source,
        );
        if let Err(e) = self.store.insert_conversation(record).await {
            warn!(error = %e, user = %anon_id, "Failed to save conversation");
        }

        info!(user = %anon_id, %source, "Chat processed");

        ChatReply {
            response,
            language: language.to_string(),
            source,
        }
    }

    async fn first_answer(&self, message: &str) -> Option<(String, ReplySource)> {
        for source in &self.sources {
            match source.answer(message).await {
                Ok(text) => {
                    debug!(source = %source.source(), "Source answered");
                    return Some((text, source.source()));
                }
                Err(declined) => {
                    info!(source = %source.source(), reason = %declined, "Source declined");
                }
            }
        }
        None
    }
}
