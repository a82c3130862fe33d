//! The message relay: parse → detect → route → translate → deliver.
//!
//! Every step after parsing absorbs its own failures. A translation failure
//! becomes a failure notice for the user; a delivery failure is logged and
//! counted. Only a payload that can't be parsed at all is reported back to
//! the caller as an error.

use crate::config::Config;
use crate::detector::{HybridDetector, LanguageDetector};
use crate::i18n::RelayMetrics;
use crate::routing::{Route, RoutingPolicy};
use crate::translation::{TranslationResult, Translator};
use crate::webhook::{parse_payload, InboundMessage, NoOpReason, ParsedPayload};
use crate::whatsapp::WhatsAppClient;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),
}

/// The single message sent back for an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient_id: String,
    pub body: String,
}

/// Reply text chosen for an inbound body, before delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub route: Route,
    /// `None` when the route skipped the translator
    pub translation: Option<TranslationResult>,
    pub body: String,
}

/// What happened to one webhook payload.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Nothing to relay (status callback, non-text message, ...)
    Ignored(NoOpReason),
    Relayed {
        outbound: OutboundMessage,
        reply: Reply,
        delivered: bool,
    },
}

/// Detect, route and (if routed) translate `body`.
///
/// Shared by the webhook pipeline and the `translate` CLI.
pub async fn compose_reply(
    detector: &dyn LanguageDetector,
    policy: &RoutingPolicy,
    translator: &Translator,
    body: &str,
) -> Reply {
    let detected = detector.detect(body);
    let route = policy.route(detected);

    match route {
        Route::Translate(pair) => {
            debug!(
                source = pair.source.code(),
                target = pair.target.code(),
                "translating message"
            );
            let translation = translator.translate(body, pair.target).await;
            let reply_body = translation.text.clone();
            Reply {
                route,
                translation: Some(translation),
                body: reply_body,
            }
        }
        Route::Unsupported { detected } => {
            debug!(
                detected = detected.map(|l| l.code()).unwrap_or("unknown"),
                "language outside the configured pair"
            );
            Reply {
                route,
                translation: None,
                body: policy.unsupported_notice(),
            }
        }
    }
}

/// Orchestrates one relay per webhook call.
///
/// Holds only immutable collaborators and atomic counters, so one instance
/// is shared by all concurrent webhook calls.
pub struct RelayPipeline {
    detector: Arc<dyn LanguageDetector>,
    policy: RoutingPolicy,
    translator: Translator,
    sender: WhatsAppClient,
    metrics: Arc<RelayMetrics>,
}

impl RelayPipeline {
    /// Build the production pipeline from config, sharing one HTTP client.
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self::from_parts(
            Arc::new(HybridDetector::new()),
            RoutingPolicy::from_config(config),
            Translator::new(client.clone(), config),
            WhatsAppClient::new(client, config),
        )
    }

    pub fn from_parts(
        detector: Arc<dyn LanguageDetector>,
        policy: RoutingPolicy,
        translator: Translator,
        sender: WhatsAppClient,
    ) -> Self {
        Self {
            detector,
            policy,
            translator,
            sender,
            metrics: Arc::new(RelayMetrics::new()),
        }
    }

    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }

    /// Run the whole relay for one raw webhook body.
    pub async fn process(&self, raw: &[u8]) -> Result<RelayOutcome, PipelineError> {
        self.metrics.record_payload_received();

        match parse_payload(raw) {
            ParsedPayload::Message(message) => Ok(self.relay(message).await),
            ParsedPayload::NoOp(reason) => {
                debug!(?reason, "webhook event carries no text message");
                self.metrics.record_noop_event();
                Ok(RelayOutcome::Ignored(reason))
            }
            ParsedPayload::Malformed(e) => {
                error!(error = %e, bytes = raw.len(), "malformed webhook payload");
                self.metrics.record_malformed_payload();
                Err(PipelineError::MalformedPayload(e))
            }
        }
    }

    /// Relay an already parsed message: exactly one send attempt.
    pub async fn relay(&self, message: InboundMessage) -> RelayOutcome {
        info!(
            sender = %message.sender_id,
            received_at = %message.received_at,
            chars = message.body.chars().count(),
            "relaying message"
        );

        let reply = compose_reply(
            self.detector.as_ref(),
            &self.policy,
            &self.translator,
            &message.body,
        )
        .await;

        match &reply.translation {
            Some(translation) => self.metrics.record_translation(translation.success),
            None => self.metrics.record_unsupported_language(),
        }

        let outbound = OutboundMessage {
            recipient_id: message.sender_id,
            body: reply.body.clone(),
        };

        let delivered = match self
            .sender
            .send_text(&outbound.recipient_id, &outbound.body)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(recipient = %outbound.recipient_id, error = %e, "delivery failed");
                false
            }
        };
        self.metrics.record_delivery(delivered);

        RelayOutcome::Relayed {
            outbound,
            reply,
            delivered,
        }
    }
}
