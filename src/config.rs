use crate::i18n::Language;
use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub translation_max_tokens: u32,

    // WhatsApp Cloud API
    pub whatsapp_api_url: String,
    pub whatsapp_access_token: String,
    pub verification_token: String,

    // Routing
    pub language_a: Language,
    pub language_b: Language,

    // Server / outbound calls
    pub port: u16,
    pub http_timeout_secs: u64,
    pub send_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    ///
    /// Unset and empty values are treated the same. Numeric values that fail
    /// to parse fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).context(format!("{} not set", key));

        let language_a_code = get("LANGUAGE_A").unwrap_or_else(|| "de".to_string());
        let language_b_code = get("LANGUAGE_B").unwrap_or_else(|| "zh".to_string());

        let config = Self {
            // OpenAI
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            openai_api_url: get("OPENAI_API_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
            translation_max_tokens: get("TRANSLATION_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),

            // WhatsApp
            whatsapp_api_url: required("WHATSAPP_API_URL")?,
            whatsapp_access_token: get("WHATSAPP_ACCESS_TOKEN")
                .or_else(|| get("ACCESS_TOKEN"))
                .context("WHATSAPP_ACCESS_TOKEN not set")?,
            verification_token: required("VERIFICATION_TOKEN")?,

            // Routing
            language_a: Language::from_code(&language_a_code)
                .context("LANGUAGE_A is not a supported language")?,
            language_b: Language::from_code(&language_b_code)
                .context("LANGUAGE_B is not a supported language")?,

            // Server
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            http_timeout_secs: get("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            send_max_attempts: get("SEND_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that a single env var can't express.
    pub fn validate(&self) -> Result<()> {
        if self.language_a == self.language_b {
            bail!(
                "LANGUAGE_A and LANGUAGE_B must differ (both are {})",
                self.language_a.code()
            );
        }
        if self.translation_max_tokens == 0 {
            bail!("TRANSLATION_MAX_TOKENS must be at least 1");
        }
        if self.http_timeout_secs == 0 {
            bail!("HTTP_TIMEOUT_SECS must be at least 1");
        }
        if self.send_max_attempts == 0 {
            bail!("SEND_MAX_ATTEMPTS must be at least 1");
        }
        Ok(())
    }

    /// Upper bound applied to every outbound HTTP request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
