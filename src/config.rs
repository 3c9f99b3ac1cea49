//! Configuration for healthbot
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Salt used when none is configured (dev mode only)
pub const DEV_ANONYMIZATION_SALT: &str = "change_this_in_production";

/// Healthbot - regional health assistant backend
#[derive(Parser, Debug, Clone)]
#[command(name = "healthbot")]
#[command(about = "Health information chatbot backend with classifier, LLM and rule-based fallbacks")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store when MongoDB is unreachable, dev salt)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "health_chatbot")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Salt appended to raw user identifiers before hashing (required in production)
    #[arg(long, env = "ANONYMIZATION_SALT")]
    pub anonymization_salt: Option<String>,

    /// Region the assistant serves, used in LLM prompts
    #[arg(long, env = "REGION_NAME", default_value = "Odisha")]
    pub region_name: String,

    /// Directory for cached reference data (disease info, vaccination schedule)
    #[arg(long, env = "CACHE_DIR", default_value = "data/cache")]
    pub cache_dir: PathBuf,

    /// Intent classifier configuration
    #[command(flatten)]
    pub classifier: ClassifierArgs,

    /// LLM configuration
    #[command(flatten)]
    pub llm: LlmArgs,

    /// Translation configuration
    #[command(flatten)]
    pub translation: TranslationArgs,

    /// Messaging configuration
    #[command(flatten)]
    pub messaging: MessagingArgs,

    /// Text-to-speech configuration
    #[command(flatten)]
    pub tts: TtsArgs,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Intent classifier (Rasa REST webhook) configuration
#[derive(Parser, Debug, Clone)]
pub struct ClassifierArgs {
    /// Classifier webhook URL
    #[arg(
        long,
        env = "CLASSIFIER_URL",
        default_value = "http://localhost:5005/webhooks/rest/webhook"
    )]
    pub classifier_url: String,

    /// Classifier request timeout in milliseconds
    #[arg(long, env = "CLASSIFIER_TIMEOUT_MS", default_value = "5000")]
    pub classifier_timeout_ms: u64,

    /// Minimum confidence for accepting a classifier answer
    #[arg(long, env = "CLASSIFIER_MIN_CONFIDENCE", default_value = "0.6")]
    pub classifier_min_confidence: f64,
}

/// Hosted LLM (OpenAI-compatible chat completions) configuration
#[derive(Parser, Debug, Clone)]
pub struct LlmArgs {
    /// Base URL of the chat-completions API
    #[arg(long, env = "LLM_API_URL", default_value = "https://openrouter.ai/api/v1")]
    pub llm_api_url: String,

    /// API key; without one the LLM source always declines
    #[arg(long, env = "LLM_API_KEY")]
    pub llm_api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "LLM_MODEL", default_value = "google/gemini-2.5-flash:free")]
    pub llm_model: String,

    /// LLM request timeout in milliseconds
    #[arg(long, env = "LLM_TIMEOUT_MS", default_value = "30000")]
    pub llm_timeout_ms: u64,

    /// Maximum tokens to generate
    #[arg(long, env = "LLM_MAX_TOKENS", default_value = "500")]
    pub llm_max_tokens: u32,

    /// Sampling temperature
    #[arg(long, env = "LLM_TEMPERATURE", default_value = "0.7")]
    pub llm_temperature: f32,
}

/// Translation (Bhashini) configuration
#[derive(Parser, Debug, Clone)]
pub struct TranslationArgs {
    /// Translation endpoint URL
    #[arg(
        long,
        env = "TRANSLATION_URL",
        default_value = "https://api.bhashini.gov.in/services/translation"
    )]
    pub translation_url: String,

    /// Translation API key; without one text is returned untranslated
    #[arg(long, env = "TRANSLATION_API_KEY")]
    pub translation_api_key: Option<String>,

    /// Translation request timeout in milliseconds
    #[arg(long, env = "TRANSLATION_TIMEOUT_MS", default_value = "30000")]
    pub translation_timeout_ms: u64,
}

/// Messaging channel used for quiz notifications
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyChannel {
    Whatsapp,
    Sms,
}

/// Messaging (Twilio) configuration
#[derive(Parser, Debug, Clone)]
pub struct MessagingArgs {
    /// Twilio REST API base URL
    #[arg(long, env = "TWILIO_API_URL", default_value = "https://api.twilio.com")]
    pub twilio_api_url: String,

    /// Twilio account SID
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token
    #[arg(long, env = "TWILIO_AUTH_TOKEN")]
    pub twilio_auth_token: Option<String>,

    /// Sender number (used for both WhatsApp and SMS)
    #[arg(long, env = "WHATSAPP_NUMBER")]
    pub whatsapp_number: Option<String>,

    /// Channel for quiz badge notifications
    #[arg(long, env = "NOTIFY_CHANNEL", value_enum, default_value = "whatsapp")]
    pub notify_channel: NotifyChannel,

    /// Messaging request timeout in milliseconds
    #[arg(long, env = "MESSAGING_TIMEOUT_MS", default_value = "10000")]
    pub messaging_timeout_ms: u64,
}

/// Text-to-speech configuration
#[derive(Parser, Debug, Clone)]
pub struct TtsArgs {
    /// TTS endpoint URL
    #[arg(
        long,
        env = "TTS_URL",
        default_value = "https://translate.google.com/translate_tts"
    )]
    pub tts_url: String,

    /// TTS request timeout in milliseconds
    #[arg(long, env = "TTS_TIMEOUT_MS", default_value = "15000")]
    pub tts_timeout_ms: u64,
}

impl Args {
    /// Effective anonymization salt (dev default when unset in dev mode)
    pub fn anonymization_salt(&self) -> &str {
        self.anonymization_salt
            .as_deref()
            .unwrap_or(DEV_ANONYMIZATION_SALT)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier.classifier_timeout_ms)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm.llm_timeout_ms)
    }

    pub fn translation_timeout(&self) -> Duration {
        Duration::from_millis(self.translation.translation_timeout_ms)
    }

    pub fn messaging_timeout(&self) -> Duration {
        Duration::from_millis(self.messaging.messaging_timeout_ms)
    }

    pub fn tts_timeout(&self) -> Duration {
        Duration::from_millis(self.tts.tts_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match self.anonymization_salt.as_deref() {
                None | Some("") => {
                    return Err("ANONYMIZATION_SALT is required in production mode".to_string())
                }
                Some(DEV_ANONYMIZATION_SALT) => {
                    return Err(
                        "ANONYMIZATION_SALT must be changed from the development default"
                            .to_string(),
                    )
                }
                Some(_) => {}
            }
        }

        if !(0.0..=1.0).contains(&self.classifier.classifier_min_confidence) {
            return Err("CLASSIFIER_MIN_CONFIDENCE must be between 0 and 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["healthbot"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dev-mode"]);
        assert_eq!(args.listen.port(), 8000);
        assert_eq!(args.mongodb_db, "health_chatbot");
        assert_eq!(args.classifier.classifier_min_confidence, 0.6);
        assert_eq!(args.messaging.notify_channel, NotifyChannel::Whatsapp);
        assert_eq!(args.anonymization_salt(), DEV_ANONYMIZATION_SALT);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_production_requires_salt() {
        let args = parse(&[]);
        assert!(args.validate().is_err());

        let args = parse(&["--anonymization-salt", DEV_ANONYMIZATION_SALT]);
        assert!(args.validate().is_err());

        let args = parse(&["--anonymization-salt", "pepper"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.anonymization_salt(), "pepper");
    }

    #[test]
    fn test_confidence_range() {
        let args = parse(&["--dev-mode", "--classifier-min-confidence", "1.5"]);
        assert!(args.validate().is_err());
    }
}
