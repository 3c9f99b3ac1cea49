//! WhatsApp and SMS notifications via the Twilio Messages API

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::build_client;
use crate::config::NotifyChannel;

/// Errors from the messaging provider
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Messaging not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Sends short text messages to a phone number
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `body` to `to`; returns the provider message id
    async fn send(
        &self,
        channel: NotifyChannel,
        to: &str,
        body: &str,
    ) -> Result<String, MessagingError>;
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Twilio account credentials and sender number
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Twilio REST client
pub struct TwilioNotifier {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<TwilioCredentials>,
}

impl TwilioNotifier {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<TwilioCredentials>,
        timeout: Duration,
    ) -> Self {
        let client = build_client(reqwest::Client::builder().timeout(timeout), "messaging");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, account_sid
        )
    }
}

/// Address a number on the given channel
fn address(channel: NotifyChannel, number: &str) -> String {
    match channel {
        NotifyChannel::Whatsapp => format!("whatsapp:{}", number),
        NotifyChannel::Sms => number.to_string(),
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(
        &self,
        channel: NotifyChannel,
        to: &str,
        body: &str,
    ) -> Result<String, MessagingError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(MessagingError::NotConfigured)?;

        let form = [
            ("To", address(channel, to)),
            ("From", address(channel, &creds.from_number)),
            ("Body", body.to_string()),
        ];

        let response = self
            .client
            .post(self.messages_url(&creds.account_sid))
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| MessagingError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MessagingError::SendFailed(format!("HTTP {}: {}", status, text)));
        }

        let message: MessageResource = response
            .json()
            .await
            .map_err(|e| MessagingError::SendFailed(e.to_string()))?;

        info!(sid = %message.sid, ?channel, "Message sent");
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> TwilioCredentials {
        TwilioCredentials {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+14155238886".into(),
        }
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let notifier = TwilioNotifier::new("http://127.0.0.1:9", None, Duration::from_secs(1));
        let err = notifier
            .send(NotifyChannel::Sms, "+911234567890", "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, MessagingError::NotConfigured));
    }

    #[tokio::test]
    async fn test_whatsapp_numbers_are_prefixed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(body_string_contains("To=whatsapp%3A%2B911234567890"))
            .and(body_string_contains("From=whatsapp%3A%2B14155238886"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "SM1"})))
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(server.uri(), Some(creds()), Duration::from_secs(5));
        let sid = notifier
            .send(NotifyChannel::Whatsapp, "+911234567890", "Well done")
            .await
            .unwrap();
        assert_eq!(sid, "SM1");
    }

    #[tokio::test]
    async fn test_sms_uses_plain_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("To=%2B911234567890"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "SM2"})))
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(server.uri(), Some(creds()), Duration::from_secs(5));
        let sid = notifier
            .send(NotifyChannel::Sms, "+911234567890", "Well done")
            .await
            .unwrap();
        assert_eq!(sid, "SM2");
    }

    #[tokio::test]
    async fn test_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad number"))
            .mount(&server)
            .await;

        let notifier = TwilioNotifier::new(server.uri(), Some(creds()), Duration::from_secs(5));
        let err = notifier
            .send(NotifyChannel::Sms, "x", "y")
            .await
            .unwrap_err();
        assert!(matches!(err, MessagingError::SendFailed(_)));
    }
}
