/*!
 * Flashcards built from translated sentences.
 *
 * A flashcard is only built when the provider kept the marker pair of the
 * original sentence; otherwise the cloze field would have no blank.
 */

use log::{info, warn};

use crate::images::ImageSet;
use crate::markup::{Dialect, MarkupTransformer};
use crate::translation::TranslationItem;

/// Text segments for one note, plus images attached during enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct Flashcard {
    /// Candidate translations of the focus span, verbatim
    pub words: String,
    /// Source-language sentence with the span underlined
    pub source_sentence: String,
    /// Target-language sentence with the span as a cloze deletion
    pub target_sentence: String,
    /// Images for this card, if enrichment ran and found any
    pub images: Option<ImageSet>,
}

impl Flashcard {
    /// Build a flashcard, or `None` when `sentence_target` lost its markers
    pub fn from_item(item: &TranslationItem) -> Option<Self> {
        if !MarkupTransformer::has_complete_span(&item.sentence_target, Dialect::Emphasis) {
            return None;
        }

        Some(Self {
            words: item.words_source.trim().to_string(),
            source_sentence: MarkupTransformer::convert(item.sentence_source.trim(), Dialect::Underline),
            target_sentence: MarkupTransformer::convert(item.sentence_target.trim(), Dialect::Cloze),
            images: None,
        })
    }

    /// Image search query for this card: the first candidate translation
    pub fn image_query(&self) -> &str {
        self.words.split(',').next().unwrap_or_default().trim()
    }

    /// HTML tags of attached images, empty when there are none
    pub fn image_tags(&self) -> &str {
        self.images.as_ref().map(|set| set.tags.as_str()).unwrap_or_default()
    }
}

/// Turns translation records into flashcards
pub struct FlashcardAssembler;

impl FlashcardAssembler {
    /// Build one flashcard per usable item, preserving order.
    ///
    /// Items whose target sentence lacks a complete marker pair are skipped
    /// with a warning, so the output is never longer than the input.
    pub fn assemble(items: &[TranslationItem]) -> Vec<Flashcard> {
        let flashcards: Vec<Flashcard> = items
            .iter()
            .filter_map(|item| {
                let card = Flashcard::from_item(item);
                if card.is_none() {
                    warn!("Skipping flashcard due to missing bold tags in: {}", item.sentence_target);
                }
                card
            })
            .collect();

        if flashcards.len() < items.len() {
            info!("Built {} of {} flashcards", flashcards.len(), items.len());
        }
        flashcards
    }
}
