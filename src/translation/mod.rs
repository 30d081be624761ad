/*!
 * Translation of marked sentences using AI providers.
 *
 * - `core`: the translation service, backend trait and provider dispatch
 * - `prompts`: instruction template and the structured response schema
 *
 * One request is sent per run: every marked line goes in a single newline
 * separated input, and the provider must answer with one structured record
 * per line.
 */

use serde::{Deserialize, Serialize};

// Re-export main types for easier usage
pub use self::core::{TranslationBackend, TranslationService};
pub use self::prompts::PromptTemplate;

// Submodules
pub mod core;
pub mod prompts;

/// One translated sentence as returned by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    /// Two lowercase candidate translations of the marked span, `", "` separated
    pub words_source: String,
    /// The sentence translated into the source language, span re-marked
    pub sentence_source: String,
    /// The original sentence with its marked span untouched
    pub sentence_target: String,
}

impl TranslationItem {
    pub fn new(
        words_source: impl Into<String>,
        sentence_source: impl Into<String>,
        sentence_target: impl Into<String>,
    ) -> Self {
        Self {
            words_source: words_source.into(),
            sentence_source: sentence_source.into(),
            sentence_target: sentence_target.into(),
        }
    }
}

/// Top-level shape of the structured provider answer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationResponse {
    #[serde(default)]
    pub translations: Vec<TranslationItem>,
}
