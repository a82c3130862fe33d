//! Language support for the relay.
//!
//! This module owns everything the relay knows about human languages: which
//! languages can be configured as a translation pair, how they are named in
//! prompts and notices, and how detector output maps onto them.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe `Language` handle validated against the registry
//! - `metrics`: Relay counters and the serialisable report served on `/health`
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Language, LanguageRegistry};
//!
//! let german = Language::from_code("de")?;
//! assert_eq!(german.name(), "German");
//!
//! let languages = LanguageRegistry::get().list_all();
//! ```

mod language;
mod metrics;
mod registry;

pub use language::Language;
pub use metrics::{MetricsReport, RelayMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
