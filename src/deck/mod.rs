/*!
 * Deck structure handed to the packaging collaborator.
 *
 * A deck holds one cloze note model, one note per flashcard and the image
 * files the notes reference. The right-to-left variant of the model marks the
 * cloze field as RTL so the target sentence renders correctly for Persian,
 * Arabic and Hebrew.
 */

use log::info;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::errors::DeckGenerationError;
use crate::flashcards::Flashcard;

pub mod apkg;

pub use self::apkg::ApkgPackager;

/// Stable identifier shared by every generated deck
pub const DECK_ID: i64 = 2025051101;

/// Model id of the left-to-right cloze model
pub const CLOZE_MODEL_ID: i64 = 2025051102;

/// Model id of the right-to-left cloze model
pub const CLOZE_RTL_MODEL_ID: i64 = 2025051103;

/// Separator between note fields in the collection
pub const FIELD_SEPARATOR: char = '\x1f';

const CLOZE_CSS: &str = ".card {
 font-family: arial;
 font-size: 20px;
 text-align: center;
 color: black;
 background-color: white;
}

.cloze {
 font-weight: bold;
 color: blue;
}

img {
 max-width: 100%;
}";

/// One field of a note model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    pub name: String,
    pub rtl: bool,
}

impl ModelField {
    fn new(name: &str, rtl: bool) -> Self {
        Self {
            name: name.to_string(),
            rtl,
        }
    }
}

/// Cloze note model definition
#[derive(Debug, Clone, PartialEq)]
pub struct NoteModel {
    pub id: i64,
    pub name: String,
    pub fields: Vec<ModelField>,
    /// Question template
    pub qfmt: String,
    /// Answer template
    pub afmt: String,
    pub css: String,
}

impl NoteModel {
    /// Cloze model with `Text`, `Words`, `Sentence` and `Images` fields.
    ///
    /// With `rtl` the `Text` field, which carries the cloze sentence, is
    /// flagged right-to-left and rendered in an RTL block.
    pub fn cloze(rtl: bool) -> Self {
        let text = if rtl {
            "<div dir=\"rtl\">{{cloze:Text}}</div>"
        } else {
            "{{cloze:Text}}"
        };
        let qfmt = format!("<i>{{{{Words}}}}</i><br><i>{{{{Sentence}}}}</i><br>{}", text);
        let afmt = format!("{}<br>{{{{Images}}}}", qfmt);

        Self {
            id: if rtl { CLOZE_RTL_MODEL_ID } else { CLOZE_MODEL_ID },
            name: if rtl { "Clozedeck Cloze (RTL)" } else { "Clozedeck Cloze" }.to_string(),
            fields: vec![
                ModelField::new("Text", rtl),
                ModelField::new("Words", false),
                ModelField::new("Sentence", false),
                ModelField::new("Images", false),
            ],
            qfmt,
            afmt,
            css: CLOZE_CSS.to_string(),
        }
    }

    pub fn is_rtl(&self) -> bool {
        self.fields.iter().any(|field| field.rtl)
    }
}

/// A note in the deck
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Stable identifier derived from the field contents
    pub guid: String,
    /// Field values in model order
    pub fields: Vec<String>,
}

impl Note {
    pub fn new(fields: Vec<String>) -> Self {
        let guid = content_guid(&fields);
        Self { guid, fields }
    }

    /// Fields joined the way the collection stores them
    pub fn joined_fields(&self) -> String {
        self.fields.join(&FIELD_SEPARATOR.to_string())
    }

    /// Cloze numbers used in the first field, ascending and deduplicated
    pub fn cloze_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .fields
            .first()
            .map(|text| {
                crate::markup::CLOZE_NUMBER_REGEX
                    .captures_iter(text)
                    .filter_map(|caps| caps[1].parse().ok())
                    .filter(|n| *n > 0)
                    .collect()
            })
            .unwrap_or_default();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

/// Short hex digest of the note fields
fn content_guid(fields: &[String]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([FIELD_SEPARATOR as u8]);
    }
    let digest = hasher.finalize();
    digest.iter().take(8).map(|byte| format!("{:02x}", byte)).collect()
}

/// Deck ready for packaging
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub model: NoteModel,
    pub notes: Vec<Note>,
    /// Media files referenced by the notes, in note order
    pub media: Vec<PathBuf>,
}

/// Builds decks from flashcards
pub struct DeckAssembler;

impl DeckAssembler {
    /// One note per flashcard, in order.
    ///
    /// Cards without images get an empty `Images` field.
    pub fn build(deck_name: &str, flashcards: &[Flashcard], is_rtl: bool) -> Deck {
        let model = NoteModel::cloze(is_rtl);
        let mut notes = Vec::with_capacity(flashcards.len());
        let mut media = Vec::new();

        for card in flashcards {
            notes.push(Note::new(vec![
                card.target_sentence.clone(),
                card.words.clone(),
                card.source_sentence.clone(),
                card.image_tags().to_string(),
            ]));
            if let Some(images) = &card.images {
                media.extend(images.files.iter().cloned());
            }
        }

        info!(
            "Assembled deck '{}' with {} note(s) and {} media file(s)",
            deck_name,
            notes.len(),
            media.len()
        );

        Deck {
            id: DECK_ID,
            name: deck_name.to_string(),
            model,
            notes,
            media,
        }
    }
}

/// Writes a deck to a file
pub trait DeckPackager: Send + Sync {
    fn write(&self, deck: &Deck, path: &Path) -> Result<(), DeckGenerationError>;
}
