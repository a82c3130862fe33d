//! Bidirectional language routing: A ⟷ B, everything else is refused.

use crate::config::Config;
use crate::i18n::Language;

/// Source and target of one translation, valid for a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

/// What the pipeline should do with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Translate(LanguagePair),
    /// Detected language is neither side of the pair (or unknown)
    Unsupported { detected: Option<Language> },
}

/// The fixed pair of languages the relay translates between.
#[derive(Debug, Clone, Copy)]
pub struct RoutingPolicy {
    language_a: Language,
    language_b: Language,
}

impl RoutingPolicy {
    pub fn new(language_a: Language, language_b: Language) -> Self {
        Self {
            language_a,
            language_b,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.language_a, config.language_b)
    }

    pub fn language_a(&self) -> Language {
        self.language_a
    }

    pub fn language_b(&self) -> Language {
        self.language_b
    }

    pub fn route(&self, detected: Option<Language>) -> Route {
        match detected {
            Some(lang) if lang == self.language_a => Route::Translate(LanguagePair {
                source: lang,
                target: self.language_b,
            }),
            Some(lang) if lang == self.language_b => Route::Translate(LanguagePair {
                source: lang,
                target: self.language_a,
            }),
            other => Route::Unsupported { detected: other },
        }
    }

    /// Reply sent instead of a translation when the language isn't A or B.
    pub fn unsupported_notice(&self) -> String {
        format!(
            "I can only translate between {} and {}.",
            self.language_a.name(),
            self.language_b.name()
        )
    }
}
