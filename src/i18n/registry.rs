//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is built once on first access with `OnceLock` and is
//! immutable afterwards, so it can be shared by every pipeline invocation
//! without locking.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "de", "zh")
    pub code: &'static str,

    /// ISO 639-3 code as reported by the language detector (e.g., "deu", "cmn")
    pub iso639_3: &'static str,

    /// English name of the language, used in prompts and notices (e.g., "German")
    pub name: &'static str,

    /// Native name of the language (e.g., "Deutsch", "中文")
    pub native_name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its ISO 639-1 code.
    ///
    /// Lookup is case-insensitive and ignores surrounding whitespace, so
    /// values read from the environment like `" DE "` still resolve.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        let code = code.trim();
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
    }

    /// Get a language configuration by its ISO 639-3 code.
    pub fn get_by_iso639_3(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.iso639_3 == code)
    }

    /// Get all languages.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }
}

/// Default language configurations.
///
/// Every language here can be picked as either side of the translation pair.
/// Chinese maps to Mandarin (`cmn`), which is what the detector reports for
/// Han script.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "de",
            iso639_3: "deu",
            name: "German",
            native_name: "Deutsch",
        },
        LanguageConfig {
            code: "zh",
            iso639_3: "cmn",
            name: "Chinese",
            native_name: "中文",
        },
        LanguageConfig {
            code: "en",
            iso639_3: "eng",
            name: "English",
            native_name: "English",
        },
        LanguageConfig {
            code: "es",
            iso639_3: "spa",
            name: "Spanish",
            native_name: "Español",
        },
        LanguageConfig {
            code: "fr",
            iso639_3: "fra",
            name: "French",
            native_name: "Français",
        },
        LanguageConfig {
            code: "it",
            iso639_3: "ita",
            name: "Italian",
            native_name: "Italiano",
        },
        LanguageConfig {
            code: "pt",
            iso639_3: "por",
            name: "Portuguese",
            native_name: "Português",
        },
        LanguageConfig {
            code: "nl",
            iso639_3: "nld",
            name: "Dutch",
            native_name: "Nederlands",
        },
        LanguageConfig {
            code: "pl",
            iso639_3: "pol",
            name: "Polish",
            native_name: "Polski",
        },
        LanguageConfig {
            code: "ru",
            iso639_3: "rus",
            name: "Russian",
            native_name: "Русский",
        },
        LanguageConfig {
            code: "uk",
            iso639_3: "ukr",
            name: "Ukrainian",
            native_name: "Українська",
        },
        LanguageConfig {
            code: "tr",
            iso639_3: "tur",
            name: "Turkish",
            native_name: "Türkçe",
        },
        LanguageConfig {
            code: "ar",
            iso639_3: "ara",
            name: "Arabic",
            native_name: "العربية",
        },
        LanguageConfig {
            code: "hi",
            iso639_3: "hin",
            name: "Hindi",
            native_name: "हिन्दी",
        },
        LanguageConfig {
            code: "ja",
            iso639_3: "jpn",
            name: "Japanese",
            native_name: "日本語",
        },
        LanguageConfig {
            code: "ko",
            iso639_3: "kor",
            name: "Korean",
            native_name: "한국어",
        },
        LanguageConfig {
            code: "vi",
            iso639_3: "vie",
            name: "Vietnamese",
            native_name: "Tiếng Việt",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_german() {
        let config = LanguageRegistry::get().get_by_code("de").unwrap();
        assert_eq!(config.code, "de");
        assert_eq!(config.iso639_3, "deu");
        assert_eq!(config.name, "German");
        assert_eq!(config.native_name, "Deutsch");
    }

    #[test]
    fn test_get_by_code_chinese() {
        let config = LanguageRegistry::get().get_by_code("zh").unwrap();
        assert_eq!(config.iso639_3, "cmn");
        assert_eq!(config.name, "Chinese");
    }

    #[test]
    fn test_get_by_code_is_case_insensitive() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.get_by_code("DE").unwrap().code, "de");
        assert_eq!(registry.get_by_code(" zh ").unwrap().code, "zh");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("xx").is_none());
        assert!(registry.get_by_code("").is_none());
    }

    #[test]
    fn test_get_by_iso639_3() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.get_by_iso639_3("deu").unwrap().code, "de");
        assert_eq!(registry.get_by_iso639_3("cmn").unwrap().code, "zh");
        assert!(registry.get_by_iso639_3("xxx").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        let all = LanguageRegistry::get().list_all();
        let codes: HashSet<_> = all.iter().map(|l| l.code).collect();
        let iso_codes: HashSet<_> = all.iter().map(|l| l.iso639_3).collect();

        assert_eq!(codes.len(), all.len());
        assert_eq!(iso_codes.len(), all.len());
    }
}
