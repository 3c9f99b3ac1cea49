//! Services layer for healthbot
//!
//! Thin clients for the external collaborators. Each one owns its own
//! `reqwest::Client` and timeout and sits behind a trait so the chain and
//! handlers can be tested with mocks.
//!
//! ## Services
//!
//! - **IntentClassifier**: Rasa REST webhook
//! - **LlmBackend**: OpenAI-compatible chat completions (OpenRouter)
//! - **Translator**: Bhashini translation, best-effort
//! - **Notifier**: WhatsApp/SMS through Twilio
//! - **SpeechSynthesizer**: Google Translate TTS

use reqwest::{Client, ClientBuilder};
use tracing::warn;

pub mod classifier;
pub mod llm;
pub mod messaging;
pub mod translation;
pub mod tts;

pub use classifier::{Classification, ClassifierError, IntentClassifier, RasaClassifier};
pub use llm::{system_prompt, CompletionRequest, LlmBackend, LlmError, OpenRouterBackend};
pub use messaging::{MessagingError, Notifier, TwilioCredentials, TwilioNotifier};
pub use translation::{needs_translation, BhashiniTranslator, Translator};
pub use tts::{GoogleTts, SpeechSynthesizer, TtsError};

/// Build a service client, falling back to reqwest defaults on failure
pub(crate) fn build_client(builder: ClientBuilder, service: &str) -> Client {
    match builder.build() {
        Ok(client) => client,
        Err(e) => {
            warn!(
                service,
                error = %e,
                "Failed to build HTTP client; using defaults without timeout"
            );
            Client::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_survives_invalid_settings() {
        let builder = Client::builder().user_agent("bad\nagent");
        let _client = build_client(builder, "test");
    }
}
