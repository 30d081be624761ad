use anyhow::{anyhow, Result};
use isolang::Language;

// Language utilities for language code handling.
// Codes are ISO 639-1 (2-letter) codes, accepted in any case and
// normalized to uppercase, the form used in deck names and configuration.

/// Deck each target language's notes are filed under
const LANGUAGE_DECKS: [(&str, &str); 9] = [
    ("EN", "01_Languages::01_English"),
    ("FR", "01_Languages::02_Français"),
    ("RU", "01_Languages::03_Русский"),
    ("DE", "01_Languages::04_Deutsch"),
    ("IT", "01_Languages::05_Italiano"),
    ("FA", "01_Languages::06_Farsi"),
    ("ES", "01_Languages::07_Español"),
    ("AR", "01_Languages::08_Arabic"),
    ("HE", "01_Languages::09_Hebrew"),
];

/// Languages written right to left
const RTL_LANGUAGES: [&str; 3] = ["FA", "AR", "HE"];

/// Normalize a language code to its uppercase form
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Get the English name of a language from its ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    if normalized.len() != 2 {
        return Err(anyhow!("Invalid language code: {}", code));
    }

    Language::from_639_1(&normalized)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Deck name for a supported target language
pub fn deck_name(target_code: &str) -> Result<&'static str> {
    let normalized = normalize_code(target_code);
    LANGUAGE_DECKS
        .iter()
        .find(|(code, _)| *code == normalized)
        .map(|(_, deck)| *deck)
        .ok_or_else(|| {
            anyhow!(
                "Unsupported target language: {} (supported: {})",
                target_code,
                supported_target_codes().join(", ")
            )
        })
}

/// Codes accepted as target languages
pub fn supported_target_codes() -> Vec<&'static str> {
    LANGUAGE_DECKS.iter().map(|(code, _)| *code).collect()
}

/// Whether a language is written right to left
pub fn is_rtl(code: &str) -> bool {
    RTL_LANGUAGES.contains(&normalize_code(code).as_str())
}
