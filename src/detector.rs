//! Language detection for inbound message text.
//!
//! Whatlang is fast and accurate on sentences but guesses wildly on short
//! greetings ("Guten Tag" comes out as Finnish). Lingua is slower and much
//! better on short text. [`HybridDetector`] asks whatlang first and falls
//! back to lingua when whatlang isn't confident. Both are pure and
//! synchronous: no I/O, same input always gives the same answer.

use crate::i18n::{Language, LanguageRegistry};
use lingua::{Language as LinguaLanguage, LanguageDetectorBuilder};
use tracing::debug;
use whatlang::Detector;

/// Whatlang answers below this confidence are handed to lingua.
const PRIMARY_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Classifies text into one of the registry languages.
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`.
    ///
    /// Returns `None` (unknown) for empty or whitespace-only text and for
    /// any language the registry doesn't carry.
    fn detect(&self, text: &str) -> Option<Language>;
}

/// Whatlang-based language detector
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }

    /// Registry language (if any) plus whatlang's confidence.
    ///
    /// `None` when whatlang can't tell the script (digits, punctuation, emoji).
    fn detect_scored(&self, text: &str) -> Option<(Option<Language>, f64)> {
        let info = self.detector.detect(text)?;
        debug!(
            lang = info.lang().code(),
            script = ?info.script(),
            confidence = info.confidence(),
            "whatlang detection"
        );

        Some((Language::from_iso639_3(info.lang().code()), info.confidence()))
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<Language> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.detect_scored(text).and_then(|(lang, _)| lang)
    }
}

/// Lingua-based detector restricted to the registry languages.
pub struct LinguaDetector {
    detector: lingua::LanguageDetector,
}

impl LinguaDetector {
    pub fn new() -> Self {
        let known = LinguaLanguage::all();
        let languages: Vec<LinguaLanguage> = LanguageRegistry::get()
            .list_all()
            .iter()
            .filter_map(|config| {
                known
                    .iter()
                    .find(|lang| lang.iso_code_639_1().to_string() == config.code)
                    .cloned()
            })
            .collect();

        debug!(languages = languages.len(), "building lingua detector");

        Self {
            detector: LanguageDetectorBuilder::from_languages(&languages).build(),
        }
    }
}

impl Default for LinguaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for LinguaDetector {
    fn detect(&self, text: &str) -> Option<Language> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let detected = self.detector.detect_language_of(text)?;
        let code = detected.iso_code_639_1().to_string();
        debug!(lang = %code, "lingua detection");

        Language::from_code(&code).ok()
    }
}

/// Whatlang first, lingua when whatlang is unsure.
pub struct HybridDetector {
    primary: WhatlangDetector,
    fallback: LinguaDetector,
}

impl HybridDetector {
    pub fn new() -> Self {
        Self {
            primary: WhatlangDetector::new(),
            fallback: LinguaDetector::new(),
        }
    }
}

impl Default for HybridDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for HybridDetector {
    fn detect(&self, text: &str) -> Option<Language> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let primary = match self.primary.detect_scored(text) {
            None => return None,
            Some((Some(lang), confidence)) if confidence >= PRIMARY_CONFIDENCE_THRESHOLD => {
                return Some(lang)
            }
            Some((lang, _)) => lang,
        };

        self.fallback.detect(text).or(primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Option<&'static str> {
        HybridDetector::new().detect(text).map(|l| l.code())
    }

    // ==================== Unknown Input ====================

    #[test]
    fn test_empty_text_is_unknown() {
        assert_eq!(detect(""), None);
        assert_eq!(WhatlangDetector::new().detect(""), None);
        assert_eq!(LinguaDetector::new().detect(""), None);
    }

    #[test]
    fn test_whitespace_only_is_unknown() {
        assert_eq!(detect("   \n\t  "), None);
    }

    #[test]
    fn test_digits_and_punctuation_are_unknown() {
        assert_eq!(detect("12345 !!! ..."), None);
    }

    // ==================== Short Greetings ====================

    #[test]
    fn test_detects_short_german_greeting() {
        assert_eq!(detect("Guten Tag"), Some("de"));
    }

    #[test]
    fn test_detects_german_good_morning() {
        assert_eq!(detect("Guten Morgen"), Some("de"));
    }

    #[test]
    fn test_lingua_detects_short_german_greeting() {
        let detected = LinguaDetector::new().detect("Guten Tag").map(|l| l.code());
        assert_eq!(detected, Some("de"));
    }

    #[test]
    fn test_detects_chinese_greeting() {
        assert_eq!(detect("你好"), Some("zh"));
    }

    // ==================== Sentences ====================

    #[test]
    fn test_detects_german_sentence() {
        assert_eq!(
            detect("Ich möchte heute Abend mit meinen Freunden in der Stadt essen gehen."),
            Some("de")
        );
    }

    #[test]
    fn test_detects_chinese_sentence() {
        assert_eq!(detect("我们明天早上在火车站见面吧"), Some("zh"));
    }

    #[test]
    fn test_english_is_neither_german_nor_chinese() {
        let detected = detect("This is a longer English sentence to ensure correct detection.");
        assert_eq!(detected, Some("en"));
    }

    #[test]
    fn test_whatlang_alone_handles_sentences() {
        let detected = WhatlangDetector::new()
            .detect("Das Wetter ist heute wirklich schön, findest du nicht auch?")
            .map(|l| l.code());
        assert_eq!(detected, Some("de"));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let detector = HybridDetector::new();
        for text in ["Guten Tag", "Das Wetter ist heute wirklich schön, findest du nicht auch?"] {
            let first = detector.detect(text);
            for _ in 0..10 {
                assert_eq!(detector.detect(text), first);
            }
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(detect("  \n你好\n  "), Some("zh"));
    }
}
