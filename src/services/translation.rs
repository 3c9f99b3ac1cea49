//! Translation client (Bhashini)
//!
//! Translation is best-effort: every failure path returns the input text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::build_client;

/// Whether answers in this language are sent through the translator
pub fn needs_translation(language: &str) -> bool {
    language.starts_with("or") || language.starts_with("hi")
}

/// Best-effort text translation
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`; returns the input unchanged on any failure
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
}

/// Bhashini translation API client
pub struct BhashiniTranslator {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl BhashiniTranslator {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = build_client(reqwest::Client::builder().timeout(timeout), "translation");

        Self {
            client,
            url: url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    async fn request(
        &self,
        api_key: &str,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<String>, reqwest::Error> {
        let response: TranslateResponse = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&TranslateRequest {
                text,
                source_language: source_lang,
                target_language: target_lang,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.translated_text)
    }
}

#[async_trait]
impl Translator for BhashiniTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        if source_lang == target_lang {
            return text.to_string();
        }

        let Some(api_key) = self.api_key.as_deref() else {
            debug!("Translation API key not configured, returning original text");
            return text.to_string();
        };

        match self.request(api_key, text, source_lang, target_lang).await {
            Ok(Some(translated)) => translated,
            Ok(None) => text.to_string(),
            Err(e) => {
                warn!(error = %e, target = target_lang, "Translation failed");
                text.to_string()
            }
        }
    }
}
