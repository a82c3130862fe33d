use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Why an outbound message could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Network failure, timeout, or anything else before a status was received
    #[error("Failed to send request to WhatsApp API: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform answered with a non-2xx status
    #[error("WhatsApp API error ({status}): {body}")]
    Api { status: StatusCode, body: String },
}

impl SendError {
    /// Connection failures, 429 and 5xx are worth another attempt.
    ///
    /// A timeout or broken response may arrive after the platform already
    /// accepted the message, so those are not retried; neither are other
    /// 4xx (bad token, bad recipient), which would fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SendError::Request(e) => e.is_connect(),
            SendError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

/// Client for the WhatsApp Cloud API messages endpoint.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
    timeout: Duration,
    retry: RetryConfig,
}

impl WhatsAppClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.whatsapp_api_url.clone(),
            access_token: config.whatsapp_access_token.clone(),
            timeout: config.http_timeout(),
            retry: RetryConfig::delivery(config.send_max_attempts),
        }
    }

    /// Override the retry policy (tests use short delays).
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Send a plain text message to `recipient_id`.
    ///
    /// Retryable failures are retried up to the configured number of attempts.
    pub async fn send_text(&self, recipient_id: &str, body: &str) -> Result<(), SendError> {
        with_retry_if(
            &self.retry,
            "WhatsApp send",
            || self.send_once(recipient_id, body),
            SendError::is_retryable,
        )
        .await
    }

    async fn send_once(&self, recipient_id: &str, body: &str) -> Result<(), SendError> {
        let request = SendMessageRequest {
            messaging_product: "whatsapp",
            to: recipient_id,
            text: TextBody { body },
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            warn!(recipient = recipient_id, %status, "WhatsApp API rejected message");
            return Err(SendError::Api { status, body });
        }

        match response.json::<SendMessageResponse>().await {
            Ok(sent) => {
                let message_id = sent.messages.first().map(|m| m.id.as_str());
                info!(recipient = recipient_id, ?message_id, "message delivered");
            }
            Err(e) => {
                // Accepted by the platform; only the receipt was unreadable
                debug!(recipient = recipient_id, error = %e, "unreadable send receipt");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(whatsapp_api_url: &str) -> Config {
        Config {
            openai_api_key: "unused".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: "http://localhost/unused".to_string(),
            translation_max_tokens: 200,
            whatsapp_api_url: whatsapp_api_url.to_string(),
            whatsapp_access_token: "test-wa-token".to_string(),
            verification_token: "unused".to_string(),
            language_a: Language::from_code("de").unwrap(),
            language_b: Language::from_code("zh").unwrap(),
            port: 3000,
            http_timeout_secs: 10,
            send_max_attempts: 3,
        }
    }

    fn client_for(mock_server: &MockServer) -> WhatsAppClient {
        let config = create_test_config(&format!("{}/v19.0/1234/messages", mock_server.uri()));
        WhatsAppClient::new(reqwest::Client::new(), &config)
            .with_retry(RetryConfig::new(3, Duration::from_millis(10)))
    }

    fn accepted_response() -> serde_json::Value {
        serde_json::json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "4915112345678", "wa_id": "4915112345678"}],
            "messages": [{"id": "wamid.HBgLNDkxNTExMjM0NTY3OBUCABEYEjQ"}]
        })
    }

    // ==================== Request Tests ====================

    #[test]
    fn test_send_message_request_serialization() {
        let request = SendMessageRequest {
            messaging_product: "whatsapp",
            to: "4915112345678",
            text: TextBody { body: "你好" },
        };

        let json = serde_json::to_value(&request).expect("Should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "4915112345678",
                "text": {"body": "你好"}
            })
        );
    }

    #[test]
    fn test_send_message_response_without_messages() {
        let response: SendMessageResponse =
            serde_json::from_str(r#"{"messaging_product": "whatsapp"}"#).unwrap();
        assert!(response.messages.is_empty());
    }

    // ==================== Retry Classification Tests ====================

    #[test]
    fn test_api_error_retry_classification() {
        let api_error = |status: u16| SendError::Api {
            status: StatusCode::from_u16(status).unwrap(),
            body: String::new(),
        };

        assert!(api_error(500).is_retryable());
        assert!(api_error(503).is_retryable());
        assert!(api_error(429).is_retryable());
        assert!(!api_error(400).is_retryable());
        assert!(!api_error(401).is_retryable());
        assert!(!api_error(404).is_retryable());
    }

    #[test]
    fn test_api_error_display() {
        let error = SendError::Api {
            status: StatusCode::UNAUTHORIZED,
            body: "Invalid OAuth access token".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Invalid OAuth access token"));
    }

    // ==================== send_text Tests ====================

    #[tokio::test]
    async fn test_send_text_posts_envelope_with_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v19.0/1234/messages"))
            .and(header("Authorization", "Bearer test-wa-token"))
            .and(body_json(serde_json::json!({
                "messaging_product": "whatsapp",
                "to": "4915112345678",
                "text": {"body": "你好"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(accepted_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server)
            .send_text("4915112345678", "你好")
            .await;
        assert!(result.is_ok(), "Should deliver: {:?}", result);
    }

    #[tokio::test]
    async fn test_send_text_accepts_unreadable_receipt() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        assert!(client_for(&mock_server).send_text("1", "hi").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_text_unauthorized_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid OAuth access token"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).send_text("1", "hi").await;
        match result {
            Err(SendError::Api { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("Invalid OAuth"));
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_text_retries_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(accepted_response()))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).send_text("1", "hi").await;
        assert!(result.is_ok(), "Should succeed after retries: {:?}", result);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_send_text_gives_up_after_max_attempts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).send_text("1", "hi").await;
        assert!(matches!(result, Err(SendError::Api { .. })));
    }

    #[tokio::test]
    async fn test_send_text_single_attempt_config() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/messages", mock_server.uri()));
        let client = WhatsAppClient::new(reqwest::Client::new(), &config)
            .with_retry(RetryConfig::new(1, Duration::from_millis(10)));

        assert!(client.send_text("1", "hi").await.is_err());
    }

    #[tokio::test]
    async fn test_send_text_network_error() {
        let config = create_test_config("http://127.0.0.1:9/messages");
        let client = WhatsAppClient::new(reqwest::Client::new(), &config)
            .with_retry(RetryConfig::new(1, Duration::from_millis(10)));

        let result = client.send_text("1", "hi").await;
        match result {
            Err(error @ SendError::Request(_)) => {
                assert!(error.is_retryable(), "Connection refused should be retryable");
            }
            other => panic!("Expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_text_timeout_is_not_retried() {
        let mock_server = MockServer::start().await;

        // Platform accepts the message but answers after our timeout
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(accepted_response())
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = create_test_config(&format!("{}/messages", mock_server.uri()));
        config.http_timeout_secs = 1;
        let client = WhatsAppClient::new(reqwest::Client::new(), &config)
            .with_retry(RetryConfig::new(3, Duration::from_millis(10)));

        let result = client.send_text("1", "hi").await;

        match result {
            Err(SendError::Request(e)) => assert!(e.is_timeout()),
            other => panic!("Expected timeout, got {:?}", other),
        }
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }
}
