//! Text-to-speech via the Google Translate TTS endpoint
//!
//! The endpoint accepts at most 100 characters per request, so text is
//! split on whitespace and the MP3 segments are concatenated.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tracing::info;

use super::build_client;
use crate::types::HealthBotError;

/// Maximum characters per TTS request
pub const MAX_CHUNK_CHARS: usize = 100;

/// Errors from speech synthesis
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("No text to synthesize")]
    EmptyText,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),
}

/// Converts text to MP3 audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, TtsError>;
}

/// Map a request language to a TTS voice language
pub fn voice_language(language: &str) -> &'static str {
    match language {
        "en" | "en-IN" => "en",
        "hi" | "hi-IN" => "hi",
        "or" | "or-IN" => "or",
        _ => "en",
    }
}

/// Split text into whitespace-delimited chunks of at most `max` characters.
/// Words longer than `max` are split mid-word.
pub fn chunk_text(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };

        if needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

/// Google Translate TTS client
pub struct GoogleTts {
    client: reqwest::Client,
    url: String,
}

impl GoogleTts {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = build_client(
            reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("Mozilla/5.0"),
            "tts",
        );

        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Bytes, TtsError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(TtsError::EmptyText);
        }

        let tl = voice_language(language);
        let total = chunks.len().to_string();
        let mut audio = BytesMut::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = self
                .client
                .get(&self.url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", tl),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| TtsError::NetworkError(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TtsError::SynthesisFailed(format!(
                    "HTTP {} for segment {}",
                    response.status(),
                    idx
                )));
            }

            let segment = response
                .bytes()
                .await
                .map_err(|e| TtsError::NetworkError(e.to_string()))?;
            audio.extend_from_slice(&segment);
        }

        info!(
            chars = text.chars().count(),
            segments = chunks.len(),
            language = tl,
            "Generated TTS audio"
        );
        Ok(audio.freeze())
    }
}

impl From<TtsError> for HealthBotError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::EmptyText => HealthBotError::BadRequest(err.to_string()),
            TtsError::NetworkError(_) | TtsError::SynthesisFailed(_) => {
                HealthBotError::Upstream(err.to_string())
            }
        }
    }
}
