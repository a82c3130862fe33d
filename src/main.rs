use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use whatsapp_translator::{
    config::Config,
    logging,
    pipeline::RelayPipeline,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env, then initialize logging
    logging::init()?;

    info!("Starting WhatsApp translator relay");

    // Load configuration from environment (fails fast on missing secrets)
    let config = Arc::new(Config::from_env()?);

    info!(
        language_a = config.language_a.code(),
        language_b = config.language_b.code(),
        model = %config.openai_model,
        timeout_secs = config.http_timeout_secs,
        send_max_attempts = config.send_max_attempts,
        "Configuration loaded"
    );

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let pipeline = Arc::new(RelayPipeline::new(&config, client));

    server::serve(AppState { config, pipeline }).await
}
