use log::{info, warn};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, SourceKind};
use crate::deck::{ApkgPackager, DeckAssembler, DeckPackager};
use crate::errors::{AppError, DeckGenerationError};
use crate::file_utils::FileManager;
use crate::flashcards::FlashcardAssembler;
use crate::images::{self, EnrichmentOutcome, GoogleImageSearch, HttpImageFetcher, ImageBox, ImageEnricher};
use crate::language_utils;
use crate::selector::MarkedLine;
use crate::sources::local::LocalSource;
use crate::sources::notion::NotionSource;
use crate::sources::{self, ContentSource};
use crate::translation::{TranslationItem, TranslationService};

// @module: Application controller for deck generation

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Where the deck was written
    pub output_path: PathBuf,
    /// Notes in the deck
    pub flashcards: usize,
    /// Media files bundled into the deck
    pub images: usize,
    /// Why images were left out, if they were
    pub images_skipped: Option<String>,
}

/// Main application controller for flashcard generation
pub struct Controller {
    // @field: App configuration
    config: Config,
    source: Box<dyn ContentSource>,
    translation_service: TranslationService,
    // @field: None when images are disabled
    enricher: Option<ImageEnricher>,
    packager: Box<dyn DeckPackager>,
}

impl Controller {
    // @method: Create a new controller with collaborators built from the configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let source: Box<dyn ContentSource> = match config.source.kind {
            SourceKind::Notion => Box::new(NotionSource::new(
                config.source.get_notion_api_key(),
                config.source.notion_endpoint.clone(),
                config.source.timeout_secs,
            )),
            SourceKind::Local => Box::new(LocalSource::new(&config.source.local_directory)),
        };

        let enricher = config.images.enabled.then(|| {
            ImageEnricher::new(
                Arc::new(GoogleImageSearch::from_env(
                    config.images.search_endpoint.clone(),
                    config.images.timeout_secs,
                )),
                Arc::new(HttpImageFetcher::new(config.images.timeout_secs)),
            )
        });

        let translation_service = TranslationService::new(config.translation.clone());

        Ok(Self::with_components(
            config,
            source,
            translation_service,
            enricher,
            Box::new(ApkgPackager::new()),
        ))
    }

    /// Create a controller from explicit collaborators
    pub fn with_components(
        config: Config,
        source: Box<dyn ContentSource>,
        translation_service: TranslationService,
        enricher: Option<ImageEnricher>,
        packager: Box<dyn DeckPackager>,
    ) -> Self {
        Self {
            config,
            source,
            translation_service,
            enricher,
            packager,
        }
    }

    /// Run the whole pipeline for one topic and write the deck.
    ///
    /// Image enrichment failures never fail the run; every other stage does.
    pub async fn run(&self, topic: &str) -> Result<RunReport, AppError> {
        let start_time = Instant::now();

        let source_language = language_utils::get_language_name(&self.config.source_language)?;
        let deck_name = language_utils::deck_name(&self.config.target_language)?;
        let is_rtl = language_utils::is_rtl(&self.config.target_language);

        let lines = sources::fetch_marked_lines(self.source.as_ref(), topic, self.config.sentence_count).await?;
        let items = self.translate_with_progress(&lines, &source_language).await?;

        let mut flashcards = FlashcardAssembler::assemble(&items);
        if flashcards.is_empty() {
            return Err(DeckGenerationError::new("No usable flashcards were produced").into());
        }

        let output_dir = PathBuf::from(&self.config.output.directory);
        FileManager::ensure_dir(&output_dir).map_err(|e| AppError::File(e.to_string()))?;

        let outcome = match &self.enricher {
            Some(enricher) => {
                let image_box = ImageBox::new(self.config.images.box_width, self.config.images.box_height);
                enricher
                    .enrich(&mut flashcards, &output_dir, self.config.images.per_query, image_box)
                    .await
            }
            None => EnrichmentOutcome::Skipped {
                reason: "image enrichment is disabled".to_string(),
            },
        };

        let deck = DeckAssembler::build(deck_name, &flashcards, is_rtl);
        let output_path = self.config.output_path();
        let written = self.packager.write(&deck, &output_path);

        // Images are bundled into the archive; the loose copies go either way
        images::remove_files(outcome.files());
        written?;

        info!(
            "Deck with {} flashcard(s) saved to {} in {:.1}s",
            deck.notes.len(),
            output_path.display(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(RunReport {
            output_path,
            flashcards: deck.notes.len(),
            images: deck.media.len(),
            images_skipped: match outcome {
                EnrichmentOutcome::Skipped { reason } => Some(reason),
                EnrichmentOutcome::Enriched { .. } => None,
            },
        })
    }

    /// Translate with a spinner while the single request is in flight
    async fn translate_with_progress(
        &self,
        lines: &[MarkedLine],
        source_language: &str,
    ) -> Result<Vec<TranslationItem>, AppError> {
        let provider = self.config.translation.provider;

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(format!(
            "Translating {} sentence(s) with {}",
            lines.len(),
            provider.display_name()
        ));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self
            .translation_service
            .translate(lines, source_language, &provider.to_lowercase_string(), None)
            .await;

        spinner.finish_and_clear();

        let items = result?;
        if items.len() != lines.len() {
            warn!("Sent {} sentence(s) but received {} translation(s)", lines.len(), items.len());
        }
        Ok(items)
    }

    /// Default topic for a run: the target language code
    pub fn default_topic(&self) -> String {
        language_utils::normalize_code(&self.config.target_language)
    }
}
