//! Language type: a validated handle into the language registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
///
/// A `Language` can only be built from an entry in the registry, so holding
/// one guarantees that its names and codes are known.
#[derive(Debug, Clone, Copy)]
pub struct Language {
    config: &'static LanguageConfig,
}

impl Language {
    /// Create a Language from an ISO 639-1 code (e.g., "de", "zh").
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { config }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Look up a Language by the ISO 639-3 code a detector reports.
    ///
    /// Returns `None` for languages the registry does not carry.
    pub fn from_iso639_3(code: &str) -> Option<Language> {
        LanguageRegistry::get()
            .get_by_iso639_3(code)
            .map(|config| Language { config })
    }

    /// Get the ISO 639-1 language code (e.g., "de").
    pub fn code(&self) -> &'static str {
        self.config.code
    }

    /// Get the English name of the language (e.g., "German").
    pub fn name(&self) -> &'static str {
        self.config.name
    }

    /// Get the native name of the language (e.g., "Deutsch").
    pub fn native_name(&self) -> &'static str {
        self.config.native_name
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.config.code == other.config.code
    }
}

impl Eq for Language {}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
