//! Intent classifier client
//!
//! Talks to a Rasa REST webhook. The webhook returns a list of bot
//! messages; some deployments are fronted by a parser that returns a single
//! object with an explicit confidence and intent, and both shapes are accepted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::build_client;

/// Reply text used when the webhook returns no messages
pub const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that.";

/// Intent reported for list-shaped replies
pub const GENERAL_QUERY_INTENT: &str = "general_query";

const LIST_REPLY_CONFIDENCE: f64 = 0.8;
const EMPTY_REPLY_CONFIDENCE: f64 = 0.1;

/// Errors from the classifier
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A classified reply
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub text: String,
    pub confidence: f64,
    pub intent: Option<String>,
}

/// Classifies a user message and proposes a reply
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<Classification, ClassifierError>;
}

#[derive(Debug, Serialize)]
struct WebhookRequest<'a> {
    sender: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ParsedReply {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    intent: Option<IntentRef>,
}

#[derive(Debug, Deserialize)]
struct IntentRef {
    name: Option<String>,
}

/// Interpret either reply shape
fn interpret(body: Value) -> Result<Classification, ClassifierError> {
    match body {
        Value::Array(messages) => Ok(match messages.first() {
            Some(first) => Classification {
                text: first
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or(NOT_UNDERSTOOD)
                    .to_string(),
                confidence: LIST_REPLY_CONFIDENCE,
                intent: Some(GENERAL_QUERY_INTENT.to_string()),
            },
            None => Classification {
                text: NOT_UNDERSTOOD.to_string(),
                confidence: EMPTY_REPLY_CONFIDENCE,
                intent: None,
            },
        }),
        Value::Object(_) => {
            let parsed: ParsedReply = serde_json::from_value(body)
                .map_err(|e| ClassifierError::ParseError(e.to_string()))?;
            Ok(Classification {
                text: parsed.text.unwrap_or_else(|| NOT_UNDERSTOOD.to_string()),
                confidence: parsed.confidence.unwrap_or(0.0),
                intent: parsed.intent.and_then(|i| i.name),
            })
        }
        other => Err(ClassifierError::ParseError(format!(
            "unexpected reply: {}",
            other
        ))),
    }
}

/// Rasa REST webhook client
pub struct RasaClassifier {
    client: reqwest::Client,
    url: String,
}

impl RasaClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = build_client(reqwest::Client::builder().timeout(timeout), "classifier");

        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IntentClassifier for RasaClassifier {
    async fn classify(&self, message: &str) -> Result<Classification, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookRequest {
                sender: "user",
                message,
            })
            .send()
            .await
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::RequestFailed(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClassifierError::ParseError(e.to_string()))?;

        let classification = interpret(body)?;
        debug!(
            confidence = classification.confidence,
            intent = ?classification.intent,
            "Classifier replied"
        );
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_interpret_list_shapes() {
        let c = interpret(json!([{"recipient_id": "user", "text": "Drink water"}])).unwrap();
        assert_eq!(c.text, "Drink water");
        assert_eq!(c.confidence, 0.8);
        assert_eq!(c.intent.as_deref(), Some(GENERAL_QUERY_INTENT));

        let c = interpret(json!([])).unwrap();
        assert_eq!(c.text, NOT_UNDERSTOOD);
        assert_eq!(c.confidence, 0.1);
        assert!(c.intent.is_none());
    }

    #[test]
    fn test_interpret_object_shape() {
        let c = interpret(json!({
            "text": "Hello!",
            "confidence": 0.93,
            "intent": {"name": "greet"}
        }))
        .unwrap();
        assert_eq!(c.confidence, 0.93);
        assert_eq!(c.intent.as_deref(), Some("greet"));

        assert!(interpret(json!("nope")).is_err());
    }

    #[tokio::test]
    async fn test_classify_posts_webhook_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/rest/webhook"))
            .and(body_json(json!({"sender": "user", "message": "fever"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"text": "Rest well"}])))
            .mount(&server)
            .await;

        let classifier = RasaClassifier::new(
            format!("{}/webhooks/rest/webhook", server.uri()),
            Duration::from_secs(5),
        );
        let c = classifier.classify("fever").await.unwrap();
        assert_eq!(c.text, "Rest well");
    }

    #[tokio::test]
    async fn test_classify_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let classifier = RasaClassifier::new(server.uri(), Duration::from_secs(5));
        let err = classifier.classify("fever").await.unwrap_err();
        assert!(matches!(err, ClassifierError::RequestFailed(_)));
    }
}
