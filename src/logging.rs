//! Process setup shared by the binaries: `.env` loading and tracing.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "whatsapp_translator=info";

/// Load `.env` (if present) and install the tracing subscriber.
///
/// The env file is read first so a `RUST_LOG` set there takes effect.
pub fn init() -> Result<()> {
    // Ignored when the variables come from the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Filter from `RUST_LOG`, falling back to this crate at info level.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
