//! WhatsApp Cloud API webhook payloads.
//!
//! The platform posts every event type (messages, delivery statuses, ...)
//! to the same endpoint. Parsing is typed and yields a discriminated result
//! instead of failing on the first missing field.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

// Lists stay untyped: only their first element is ever read, so a bad
// shape further along can't fail the whole payload.

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub from: Option<String>,
    /// Unix seconds, sent as a string
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: Option<String>,
}

/// A text message extracted from a webhook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

/// Why a well-formed payload carries nothing to relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoOpReason {
    /// `entry[0].changes[0].value.messages[0]` is absent (e.g. a status callback)
    NoMessage,
    /// The first message has no text body (image, sticker, reaction, ...)
    NotText { message_type: Option<String> },
    /// The first message has no sender to reply to
    MissingSender,
}

/// Result of reading a raw webhook body.
#[derive(Debug)]
pub enum ParsedPayload {
    Message(InboundMessage),
    NoOp(NoOpReason),
    Malformed(serde_json::Error),
}

/// Parse a raw webhook body.
///
/// Only `entry[0].changes[0].value.messages[0]` is considered. Missing
/// fields along that path are a [`ParsedPayload::NoOp`]; a body that is not
/// JSON, or whose fields on that path have the wrong type, is
/// [`ParsedPayload::Malformed`]. Later entries, changes and messages are
/// never inspected.
pub fn parse_payload(raw: &[u8]) -> ParsedPayload {
    let message = match first_message(raw) {
        Ok(Some(message)) => message,
        Ok(None) => return ParsedPayload::NoOp(NoOpReason::NoMessage),
        Err(e) => return ParsedPayload::Malformed(e),
    };

    let Some(body) = message.text.and_then(|text| text.body) else {
        return ParsedPayload::NoOp(NoOpReason::NotText {
            message_type: message.message_type,
        });
    };

    let sender_id = match message.from {
        Some(from) if !from.trim().is_empty() => from,
        _ => return ParsedPayload::NoOp(NoOpReason::MissingSender),
    };

    let received_at = message
        .timestamp
        .as_deref()
        .and_then(parse_unix_timestamp)
        .unwrap_or_else(Utc::now);

    ParsedPayload::Message(InboundMessage {
        sender_id,
        body,
        received_at,
    })
}

/// Walk `entry[0].changes[0].value.messages[0]`, typing one step at a time.
fn first_message(raw: &[u8]) -> Result<Option<IncomingMessage>, serde_json::Error> {
    let payload: WebhookPayload = serde_json::from_slice(raw)?;

    let Some(entry) = first::<Entry>(payload.entry)? else {
        return Ok(None);
    };
    let Some(change) = first::<Change>(entry.changes)? else {
        return Ok(None);
    };
    let Some(value) = change.value else {
        return Ok(None);
    };
    first::<IncomingMessage>(value.messages)
}

fn first<T: DeserializeOwned>(items: Option<Vec<Value>>) -> Result<Option<T>, serde_json::Error> {
    match items.and_then(|items| items.into_iter().next()) {
        Some(item) => serde_json::from_value(item).map(Some),
        None => Ok(None),
    }
}

fn parse_unix_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = value.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0)
}
