//! WhatsApp translator relay.
//!
//! Receives WhatsApp Cloud API webhooks, detects the language of each text
//! message, translates it between two configured languages with an
//! OpenAI-compatible model and sends the result back to the sender.

pub mod config;
pub mod detector;
pub mod i18n;
pub mod logging;
pub mod pipeline;
pub mod retry;
pub mod routing;
pub mod security;
pub mod server;
pub mod translation;
pub mod webhook;
pub mod whatsapp;
