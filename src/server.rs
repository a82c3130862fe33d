//! HTTP surface: webhook verification, webhook receipt, health.

use crate::config::Config;
use crate::pipeline::RelayPipeline;
use crate::security::constant_time_compare;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<RelayPipeline>,
}

/// Query parameters of the subscription handshake (`GET /webhook`).
#[derive(Debug, Default, Deserialize)]
pub struct VerificationChallenge {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Returns the challenge to echo when the handshake is valid.
///
/// Valid means `hub.mode` is present and non-empty and `hub.verify_token`
/// matches the configured secret. A missing challenge echoes as empty.
pub fn verify_challenge(params: &VerificationChallenge, expected_token: &str) -> Option<String> {
    let mode = params.mode.as_deref().filter(|m| !m.is_empty())?;
    let token = params.token.as_deref()?;

    if !constant_time_compare(token, expected_token) {
        return None;
    }

    debug!(mode, "webhook verification accepted");
    Some(params.challenge.clone().unwrap_or_default())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /webhook
async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerificationChallenge>,
) -> Response {
    match verify_challenge(&params, &state.config.verification_token) {
        Some(challenge) => {
            info!("webhook subscription verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!(mode = ?params.mode, "webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

/// POST /webhook
///
/// The relay runs in its own task: it finishes even if the platform hangs
/// up, and a panic inside it still gets a 500 instead of a dropped request.
async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let pipeline = Arc::clone(&state.pipeline);
    let result = tokio::spawn(async move { pipeline.process(&body).await }).await;

    match result {
        Ok(Ok(outcome)) => {
            debug!(?outcome, "webhook processed");
            (StatusCode::OK, Json(json!({"status": "success"})))
        }
        Ok(Err(e)) => {
            error!(error = %e, "error processing webhook");
            internal_error()
        }
        Err(e) => {
            error!(error = %e, "webhook task aborted");
            internal_error()
        }
    }
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "error", "message": "Internal Server Error"})),
    )
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    let policy = state.pipeline.policy();
    let languages: Vec<Value> = [policy.language_a(), policy.language_b()]
        .iter()
        .map(|lang| {
            json!({
                "code": lang.code(),
                "name": lang.name(),
                "native_name": lang.native_name(),
            })
        })
        .collect();

    Json(json!({
        "status": "ok",
        "languages": languages,
        "metrics": state.pipeline.metrics().report(),
    }))
}

/// Bind the configured port and serve until Ctrl-C / SIGTERM.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!("Server is running on http://{}", addr);

    let pipeline = Arc::clone(&state.pipeline);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!(metrics = ?pipeline.metrics().report(), "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
