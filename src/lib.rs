/*!
 * # clozedeck
 *
 * A Rust library that turns sentences containing one marked word into
 * cloze-deletion flashcards packaged as an Anki deck.
 *
 * ## Features
 *
 * - Read marked sentences from a Notion page or a local Markdown/text file
 * - Translate them in one request using various AI providers:
 *   - Google Gemini
 *   - OpenAI API
 *   - Anthropic API
 * - Convert between emphasis, underline and cloze markup
 * - Optionally illustrate each card with images from Google Custom Search
 * - Write `.apkg` packages with a right-to-left variant for FA, AR and HE
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `markup`: Markup dialects and conversion between them
 * - `selector`: Rules deciding which source lines are usable
 * - `sources`: Document sources (`sources::notion`, `sources::local`)
 * - `translation`: Prompting, dispatch and response validation:
 *   - `translation::core`: The translation service and backend capability
 *   - `translation::prompts`: Instructions and response schemas
 * - `providers`: Client implementations for the LLM providers:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::anthropic`: Anthropic API client
 * - `flashcards`: Flashcards built from translations
 * - `images`: Best-effort image enrichment
 * - `deck`: Deck assembly and `.apkg` packaging
 * - `app_controller`: Runs the pipeline end to end
 * - `file_utils`: File system operations
 * - `language_utils`: Language names, deck names and text direction
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod deck;
pub mod errors;
pub mod file_utils;
pub mod flashcards;
pub mod images;
pub mod language_utils;
pub mod markup;
pub mod providers;
pub mod selector;
pub mod sources;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunReport};
pub use deck::{Deck, DeckAssembler, DeckPackager};
pub use errors::{AppError, DeckGenerationError, ImageError, MarkupError, ProviderError, SourceError, TranslationError};
pub use flashcards::{Flashcard, FlashcardAssembler};
pub use markup::{Dialect, MarkupTransformer};
pub use selector::{ContentSelector, MarkedLine};
pub use translation::{TranslationItem, TranslationService};
