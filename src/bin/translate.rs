//! Translate binary - runs detection, routing and translation for one message
//! and prints the reply that would be sent, without touching WhatsApp.
//!
//! Usage:
//!   cargo run --bin translate -- "Guten Tag"
//!   echo "你好" | cargo run --bin translate
//!
//! Required environment variables:
//! - OPENAI_API_KEY
//!
//! Optional:
//! - OPENAI_MODEL (defaults to gpt-4o-mini)
//! - OPENAI_API_URL (defaults to the OpenAI chat completions endpoint)
//! - LANGUAGE_A / LANGUAGE_B (default to de / zh)
//! - TRANSLATION_MAX_TOKENS (defaults to 200)
//! - HTTP_TIMEOUT_SECS (defaults to 10)

use anyhow::{Context, Result};
use std::io::Read;
use tracing::info;
use whatsapp_translator::{
    config::Config,
    detector::HybridDetector,
    logging,
    pipeline::compose_reply,
    routing::{Route, RoutingPolicy},
    translation::Translator,
};

/// Minimal config for the CLI (no WhatsApp credentials required)
fn load_config() -> Result<Config> {
    Config::from_lookup(|key| match key {
        "WHATSAPP_API_URL" => Some("http://unused.invalid/messages".to_string()),
        "WHATSAPP_ACCESS_TOKEN" => Some("unused".to_string()),
        "VERIFICATION_TOKEN" => Some("unused".to_string()),
        other => std::env::var(other).ok(),
    })
}

/// Message text from the command line, or stdin when no arguments are given
fn read_message() -> Result<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read message from stdin")?;
    Ok(text.trim_end_matches('\n').to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let config = load_config()?;
    let message = read_message()?;

    info!(
        "Translating between {} and {} with {}",
        config.language_a, config.language_b, config.openai_model
    );

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let detector = HybridDetector::new();
    let policy = RoutingPolicy::from_config(&config);
    let translator = Translator::new(client, &config);

    let reply = compose_reply(&detector, &policy, &translator, &message).await;

    let route = match reply.route {
        Route::Translate(pair) => format!("{} → {}", pair.source.name(), pair.target.name()),
        Route::Unsupported {
            detected: Some(lang),
        } => format!("{} (not translated)", lang.name()),
        Route::Unsupported { detected: None } => "unknown (not translated)".to_string(),
    };

    println!();
    println!("--- Input ---");
    println!("{}", message);
    println!();
    println!("--- Route: {} ---", route);
    if let Some(translation) = &reply.translation {
        println!(
            "--- Translation: {} ---",
            if translation.success { "ok" } else { "failed" }
        );
    }
    println!();
    println!("--- Reply (as sent to WhatsApp) ---");
    println!("{}", reply.body);
    println!();

    Ok(())
}
