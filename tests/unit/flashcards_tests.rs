/*!
 * Tests for flashcard assembly
 */

use clozedeck::flashcards::{Flashcard, FlashcardAssembler};
use clozedeck::markup::{Dialect, MarkupTransformer};
use clozedeck::translation::TranslationItem;
use crate::common;
use crate::common::log_capture;

#[test]
fn test_assemble_withWellFormedItems_shouldConvertMarkup() {
    let cards = FlashcardAssembler::assemble(&common::sample_items());

    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].words, "school, schoolhouse");
    assert_eq!(cards[0].source_sentence, "I go to <u>school</u> every day.");
    assert_eq!(cards[0].target_sentence, "Je vais à l'{{c1::école}} tous les jours.");
    assert!(cards.iter().all(|card| card.images.is_none()));
}

#[test]
fn test_assemble_withAdvantageItem_shouldProduceClozeAndUnderline() {
    let item = TranslationItem::new(
        "avantage, bénéfice",
        "Parler plusieurs langues est un vrai **avantage**.",
        "Speaking several languages is a real **advantage**.",
    );

    let cards = FlashcardAssembler::assemble(&[item]);

    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].words, "avantage, bénéfice");
    assert_eq!(cards[0].target_sentence, "Speaking several languages is a real {{c1::advantage}}.");
    assert_eq!(cards[0].source_sentence, "Parler plusieurs langues est un vrai <u>avantage</u>.");
}

#[test]
fn test_assemble_withItemMissingMarkers_shouldLogWarning() {
    log_capture::init();
    let items = vec![TranslationItem::new("x", "**A**", "no markers here")];

    let cards = FlashcardAssembler::assemble(&items);

    assert!(cards.is_empty());
    let warnings = log_capture::take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("no markers here"));
}

#[test]
fn test_assemble_withItemMissingMarkers_shouldSkipIt() {
    let items = vec![
        TranslationItem::new("x", "**A**", "no markers here"),
        TranslationItem::new("y", "**B**", "has **one**"),
    ];

    let cards = FlashcardAssembler::assemble(&items);

    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].target_sentence, "has {{c1::one}}");
    assert_eq!(cards[0].source_sentence, "<u>B</u>");
}

#[test]
fn test_assemble_withUnbalancedTarget_shouldSkipIt() {
    let items = vec![TranslationItem::new("x", "**A**", "**one** and **two")];
    assert!(FlashcardAssembler::assemble(&items).is_empty());
}

#[test]
fn test_assemble_shouldNeverGrowAndAlwaysContainCloze() {
    let items = vec![
        TranslationItem::new("a", "**a**", "**a**"),
        TranslationItem::new("b", "b", "b"),
        TranslationItem::new("c", "**c**", "x **c** y"),
        TranslationItem::new("d", "**d**", "****"),
        TranslationItem::new("e", "e", "**e** **f**"),
    ];

    let cards = FlashcardAssembler::assemble(&items);

    assert!(cards.len() <= items.len());
    assert_eq!(cards.len(), 3);
    for card in &cards {
        assert!(MarkupTransformer::span_count(&card.target_sentence, Dialect::Cloze) >= 1);
    }
}

#[test]
fn test_assemble_withEmptyInput_shouldReturnEmpty() {
    assert!(FlashcardAssembler::assemble(&[]).is_empty());
}

#[test]
fn test_fromItem_withMissingSourceMarkers_shouldStillBuild() {
    let card = Flashcard::from_item(&TranslationItem::new("w", "no markers", "a **b**")).unwrap();
    assert_eq!(card.source_sentence, "no markers");
    assert_eq!(card.image_query(), "w");
}
