/*!
 * Tests for deck assembly
 */

use std::path::PathBuf;

use clozedeck::deck::{DeckAssembler, NoteModel, CLOZE_MODEL_ID, CLOZE_RTL_MODEL_ID, DECK_ID};
use clozedeck::flashcards::FlashcardAssembler;
use clozedeck::images::ImageSet;
use clozedeck::language_utils;
use crate::common;

#[test]
fn test_build_shouldCreateOneNotePerFlashcardInOrder() {
    let cards = FlashcardAssembler::assemble(&common::sample_items());
    let deck = DeckAssembler::build("01_Languages::02_Français", &cards, false);

    assert_eq!(deck.id, DECK_ID);
    assert_eq!(deck.name, "01_Languages::02_Français");
    assert_eq!(deck.model.id, CLOZE_MODEL_ID);
    assert_eq!(deck.notes.len(), cards.len());
    for (note, card) in deck.notes.iter().zip(&cards) {
        assert_eq!(note.fields[0], card.target_sentence);
        assert_eq!(note.fields[1], card.words);
        assert_eq!(note.fields[2], card.source_sentence);
        assert_eq!(note.fields[3], "");
    }
}

#[test]
fn test_build_forRtlLanguage_shouldUseRtlModel() {
    let cards = FlashcardAssembler::assemble(&common::sample_items());
    for code in ["FA", "AR", "HE"] {
        let deck = DeckAssembler::build(language_utils::deck_name(code).unwrap(), &cards, language_utils::is_rtl(code));
        assert_eq!(deck.model.id, CLOZE_RTL_MODEL_ID);
        assert!(deck.model.fields[0].rtl);
    }

    let deck = DeckAssembler::build("deck", &cards, language_utils::is_rtl("FR"));
    assert!(!deck.model.is_rtl());
}

#[test]
fn test_build_withPartialImages_shouldKeepFieldsPositional() {
    let mut cards = FlashcardAssembler::assemble(&common::sample_items());
    cards[1].images = Some(ImageSet {
        files: vec![PathBuf::from("out/good-1.jpg")],
        tags: "<img src='good-1.jpg'>".to_string(),
    });

    let deck = DeckAssembler::build("deck", &cards, false);

    assert_eq!(deck.notes[0].fields[3], "");
    assert_eq!(deck.notes[1].fields[3], "<img src='good-1.jpg'>");
    assert_eq!(deck.notes[2].fields[3], "");
    assert_eq!(deck.media, vec![PathBuf::from("out/good-1.jpg")]);
}

#[test]
fn test_build_twice_shouldProduceIdenticalNotes() {
    let cards = FlashcardAssembler::assemble(&common::sample_items());
    let first = DeckAssembler::build("deck", &cards, false);
    let second = DeckAssembler::build("deck", &cards, false);
    assert_eq!(first, second);
}

#[test]
fn test_clozeModel_shouldExposeFourFields() {
    let names: Vec<String> = NoteModel::cloze(false).fields.into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["Text", "Words", "Sentence", "Images"]);
}
