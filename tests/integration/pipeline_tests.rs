/*!
 * End-to-end tests for the deck generation pipeline
 */

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use clozedeck::app_config::Config;
use clozedeck::app_controller::Controller;
use clozedeck::deck::{ApkgPackager, DeckPackager, DECK_ID};
use clozedeck::errors::{AppError, SourceError, TranslationError};
use clozedeck::images::ImageEnricher;
use clozedeck::sources::local::LocalSource;
use clozedeck::sources::ContentSource;
use clozedeck::translation::TranslationService;
use crate::common;
use crate::common::mock_providers::{
    FailingPackager, MockContentSource, MockErrorType, MockImageFetch, MockImageSearch, MockTranslationBackend,
};

fn controller(
    config: Config,
    source: Box<dyn ContentSource>,
    backend: Arc<MockTranslationBackend>,
    search: Option<MockImageSearch>,
    packager: Box<dyn DeckPackager>,
) -> Controller {
    common::init_test_logging();
    let translation_service = TranslationService::with_backend(config.translation.clone(), backend);
    let enricher = search.map(|search| ImageEnricher::new(Arc::new(search), Arc::new(MockImageFetch)));
    Controller::with_components(config, source, translation_service, enricher, packager)
}

fn local_controller(root: &Path, backend: Arc<MockTranslationBackend>, search: Option<MockImageSearch>) -> Controller {
    let config = common::test_config(root);
    let source = Box::new(LocalSource::new(&config.source.local_directory));
    controller(config, source, backend, search, Box::new(ApkgPackager::new()))
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[tokio::test]
async fn test_run_withImages_shouldPackageDeckAndRemoveLooseImages() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;
    let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
    let controller = local_controller(dir.path(), backend.clone(), Some(MockImageSearch::returning(&["good-1", "good-2"])));

    let report = controller.run("FR").await?;

    assert_eq!(report.flashcards, 3);
    assert_eq!(report.images, 6);
    assert!(report.images_skipped.is_none());
    assert_eq!(
        backend.tracker().lock().last_request.as_deref(),
        Some("Je vais à l'**école** tous les jours.\nC'est une **bonne** amie.\nNous **mangeons** ensemble.")
    );

    let package = common::read_package(&report.output_path)?;
    assert_eq!(package.note_fields.len(), 3);
    assert_eq!(package.media.len(), 6);
    assert!(package.entries.iter().any(|entry| entry == "5"));
    assert!(package.card_decks.iter().all(|did| *did == DECK_ID));

    let first: Vec<&str> = package.note_fields[0].split('\x1f').collect();
    assert_eq!(first[0], "Je vais à l'{{c1::école}} tous les jours.");
    assert_eq!(first[1], "school, schoolhouse");
    assert_eq!(first[2], "I go to <u>school</u> every day.");
    assert_eq!(first[3].matches("<img src='school-").count(), 2);

    assert_eq!(files_in(&dir.path().join("output")), vec!["flashcard_deck.apkg"]);
    Ok(())
}

#[tokio::test]
async fn test_run_withQuotaExceeded_shouldStillWriteDeckWithEmptyImages() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;
    let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
    let controller = local_controller(dir.path(), backend, Some(MockImageSearch::quota_exceeded()));

    let report = controller.run("FR").await?;

    assert!(report.images_skipped.as_deref().unwrap_or_default().contains("Quota exceeded"));
    let warnings = common::log_capture::take_warnings();
    assert!(warnings
        .iter()
        .any(|warning| warning.contains("Proceeding without images") && warning.contains("Quota exceeded")));
    let package = common::read_package(&report.output_path)?;
    assert_eq!(package.note_fields.len(), 3);
    assert!(package.media.is_empty());
    for fields in &package.note_fields {
        let fields: Vec<&str> = fields.split('\x1f').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[3], "");
    }
    Ok(())
}

#[tokio::test]
async fn test_run_twice_shouldProduceIdenticalNotes() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;

    let mut runs = Vec::new();
    for _ in 0..2 {
        let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
        let controller = local_controller(dir.path(), backend, None);
        let report = controller.run("FR").await?;
        runs.push(common::read_package(&report.output_path)?);
    }

    assert_eq!(runs[0].note_fields, runs[1].note_fields);
    assert_eq!(runs[0].note_guids, runs[1].note_guids);
    Ok(())
}

#[tokio::test]
async fn test_run_withMalformedItem_shouldSkipItAndKeepOthers() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;
    let mut items = common::sample_items();
    items[1].sentence_target = "C'est une bonne amie.".to_string();
    let controller = local_controller(dir.path(), Arc::new(MockTranslationBackend::returning(items)), None);

    let report = controller.run("FR").await?;

    assert_eq!(report.flashcards, 2);
    Ok(())
}

#[tokio::test]
async fn test_run_withNoUsableLines_shouldFailBeforeTranslation() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
    let source = Box::new(MockContentSource::new("FR", &["plain", "**unbalanced", ""]));
    let controller = controller(config, source, backend.clone(), None, Box::new(ApkgPackager::new()));

    let result = controller.run("FR").await;

    assert!(matches!(result, Err(AppError::Source(SourceError::PageEmpty(_)))));
    assert_eq!(backend.tracker().lock().call_count, 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withUnknownTopic_shouldFailAsPageNotFound() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
    let source = Box::new(MockContentSource::new("FR", &["a **b**"]));
    let controller = controller(config, source, backend, None, Box::new(ApkgPackager::new()));

    let result = controller.run("DE").await;

    assert!(matches!(result, Err(AppError::Source(SourceError::PageNotFound(topic))) if topic == "DE"));
    Ok(())
}

#[tokio::test]
async fn test_run_withProviderFailure_shouldWriteNothing() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;
    let backend = Arc::new(MockTranslationBackend::failing(MockErrorType::Auth));
    let controller = local_controller(dir.path(), backend, Some(MockImageSearch::returning(&["good-1"])));

    let result = controller.run("FR").await;

    assert!(matches!(result, Err(AppError::Translation(TranslationError::Provider(_)))));
    assert!(files_in(&dir.path().join("output")).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_withConfiguredModelContainingSpace_shouldFailBeforeTranslation() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;
    let mut config = common::test_config(dir.path());
    let provider = config.translation.provider.to_lowercase_string();
    if let Some(provider_config) = config
        .translation
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == provider)
    {
        provider_config.model = "gpt 4o".to_string();
    }
    let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
    let source = Box::new(LocalSource::new(&config.source.local_directory));
    let controller = controller(config, source, backend.clone(), None, Box::new(ApkgPackager::new()));

    let result = controller.run("FR").await;

    assert!(matches!(result, Err(AppError::Translation(TranslationError::UnsupportedModel(model))) if model == "gpt 4o"));
    assert_eq!(backend.tracker().lock().call_count, 0);
    assert!(files_in(&dir.path().join("output")).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyTranslation_shouldFailAsEmptyResult() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_file(&dir.path().join("pages"), "FR.md", common::sample_page())?;
    let controller = local_controller(dir.path(), Arc::new(MockTranslationBackend::returning(Vec::new())), None);

    let result = controller.run("FR").await;

    assert!(matches!(result, Err(AppError::Translation(TranslationError::EmptyResult))));
    Ok(())
}

#[tokio::test]
async fn test_run_withPackagingFailure_shouldFailAndRemoveImages() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config(dir.path());
    let output_dir = dir.path().join("output");
    let backend = Arc::new(MockTranslationBackend::returning(common::sample_items()));
    let source = Box::new(MockContentSource::new("FR", &["Je vais à l'**école** tous les jours."]));
    let controller = controller(
        config,
        source,
        backend,
        Some(MockImageSearch::returning(&["good-1"])),
        Box::new(FailingPackager),
    );

    let result = controller.run("FR").await;

    assert!(matches!(result, Err(AppError::Deck(_))));
    assert!(files_in(&output_dir).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_run_forRtlTarget_shouldUseHebrewDeck() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut config = common::test_config(dir.path());
    config.target_language = "HE".to_string();
    let backend = Arc::new(MockTranslationBackend::returning(vec![clozedeck::TranslationItem::new(
        "school, academy",
        "I go to **school**.",
        "אני הולך **לבית הספר**.",
    )]));
    let source = Box::new(MockContentSource::new("HE", &["אני הולך **לבית הספר**."]));
    let controller = controller(config, source, backend, None, Box::new(ApkgPackager::new()));

    let report = controller.run("HE").await?;

    let package = common::read_package(&report.output_path)?;
    assert!(package.note_fields[0].starts_with("אני הולך {{c1::לבית הספר}}."));
    Ok(())
}
