//! Relay metrics and observability module.
//!
//! Counters are owned by the pipeline instance (not a global) and shared by
//! reference with the HTTP layer, which serves them on `/health`.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for everything the relay pipeline does.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Webhook payloads handed to the pipeline
    payloads_received: AtomicUsize,

    /// Payloads that carried no text message (status callbacks etc.)
    noop_events: AtomicUsize,

    /// Payloads that could not be parsed at all
    malformed_payloads: AtomicUsize,

    /// Messages detected as neither side of the language pair
    unsupported_language: AtomicUsize,

    /// Translation calls that produced text
    translations_succeeded: AtomicUsize,

    /// Translation calls that fell back to the failure notice
    translations_failed: AtomicUsize,

    /// Outbound messages accepted by the messaging platform
    deliveries_succeeded: AtomicUsize,

    /// Outbound messages that could not be delivered
    deliveries_failed: AtomicUsize,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_payload_received(&self) {
        self.payloads_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_noop_event(&self) {
        self.noop_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed_payload(&self) {
        self.malformed_payloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported_language(&self) {
        self.unsupported_language.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation(&self, success: bool) {
        if success {
            self.translations_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.translations_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_delivery(&self, success: bool) {
        if success {
            self.deliveries_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.deliveries_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let translations_succeeded = self.translations_succeeded.load(Ordering::Relaxed);
        let translations_failed = self.translations_failed.load(Ordering::Relaxed);
        let deliveries_succeeded = self.deliveries_succeeded.load(Ordering::Relaxed);
        let deliveries_failed = self.deliveries_failed.load(Ordering::Relaxed);

        MetricsReport {
            payloads_received: self.payloads_received.load(Ordering::Relaxed),
            noop_events: self.noop_events.load(Ordering::Relaxed),
            malformed_payloads: self.malformed_payloads.load(Ordering::Relaxed),
            unsupported_language: self.unsupported_language.load(Ordering::Relaxed),
            translations_succeeded,
            translations_failed,
            translation_success_rate: success_rate(translations_succeeded, translations_failed),
            deliveries_succeeded,
            deliveries_failed,
            delivery_success_rate: success_rate(deliveries_succeeded, deliveries_failed),
        }
    }
}

/// Percentage of successes (0-100); 0.0 when nothing has been attempted.
fn success_rate(succeeded: usize, failed: usize) -> f64 {
    let total = succeeded + failed;
    if total > 0 {
        (succeeded as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Snapshot of the relay counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub payloads_received: usize,
    pub noop_events: usize,
    pub malformed_payloads: usize,
    pub unsupported_language: usize,
    pub translations_succeeded: usize,
    pub translations_failed: usize,

    /// Translation success rate as a percentage (0-100)
    pub translation_success_rate: f64,

    pub deliveries_succeeded: usize,
    pub deliveries_failed: usize,

    /// Delivery success rate as a percentage (0-100)
    pub delivery_success_rate: f64,
}
