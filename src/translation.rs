use crate::config::Config;
use crate::i18n::Language;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Text sent back to the user when the provider call fails.
pub const TRANSLATION_FAILURE_NOTICE: &str = "❌ Translation failed.";

/// Completion cap used for reasoning models, which spend tokens before answering.
const REASONING_MAX_COMPLETION_TOKENS: u32 = 4000;

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Outcome of one translation attempt.
///
/// On failure `text` holds the user-facing failure notice, never provider output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub text: String,
    pub success: bool,
}

impl TranslationResult {
    pub fn translated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            success: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            text: TRANSLATION_FAILURE_NOTICE.to_string(),
            success: false,
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a professional translator for a chat service. \
Reply with the translation only: no quotes, notes, transliterations or explanations. \
Keep emojis, names, numbers and URLs unchanged.";

/// Build the user prompt embedding the target language and the literal text
fn build_translation_prompt(text: &str, target_language: &str) -> String {
    format!("Translate this text to {}: {}", target_language, text)
}

/// Translates chat messages through an OpenAI-compatible chat completions endpoint.
///
/// Makes exactly one request per call. Retrying is left to the platform's
/// webhook redelivery.
#[derive(Clone)]
pub struct Translator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl Translator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.openai_api_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            max_tokens: config.translation_max_tokens,
            timeout: config.http_timeout(),
        }
    }

    /// Translate `text` into `target_language`.
    ///
    /// Never fails: network errors, timeouts, non-2xx statuses and unusable
    /// response bodies all produce [`TranslationResult::failed`].
    pub async fn translate(&self, text: &str, target_language: Language) -> TranslationResult {
        match self.request_translation(text, target_language).await {
            Ok(translated) => {
                debug!(target_language = target_language.code(), "translation succeeded");
                TranslationResult::translated(translated)
            }
            Err(e) => {
                warn!(
                    target_language = target_language.code(),
                    error = %format!("{:#}", e),
                    "translation failed"
                );
                TranslationResult::failed()
            }
        }
    }

    fn build_request(&self, text: &str, target_language: Language) -> TranslationRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);

        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_translation_prompt(text, target_language.name()),
                },
            ],
            max_completion_tokens: if is_reasoning {
                REASONING_MAX_COMPLETION_TOKENS.max(self.max_tokens)
            } else {
                self.max_tokens
            },
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }

    async fn request_translation(&self, text: &str, target_language: Language) -> Result<String> {
        let request = self.build_request(text, target_language);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .context("Failed to send translation request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("OpenAI API error during translation ({}): {}", status, body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI translation response")?;

        let translated = chat_response
            .choices
            .into_iter()
            .next()
            .context("OpenAI translation response contained no choices")?
            .message
            .content
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            anyhow::bail!("OpenAI translation response was empty");
        }

        Ok(translated)
    }
}
