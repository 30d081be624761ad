// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use clozedeck::app_config::{self, Config, SourceKind, TranslationProvider};
use clozedeck::app_controller::Controller;
use clozedeck::file_utils::FileManager;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for SourceKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSourceKind {
    Notion,
    Local,
}

impl From<CliSourceKind> for SourceKind {
    fn from(cli_source: CliSourceKind) -> Self {
        match cli_source {
            CliSourceKind::Notion => SourceKind::Notion,
            CliSourceKind::Local => SourceKind::Local,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for clozedeck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// clozedeck - cloze flashcards from your own sentences
///
/// Reads sentences with one **bold** word from a Notion page or a local file,
/// translates them with an AI provider and writes an Anki deck.
#[derive(Parser, Debug)]
#[command(name = "clozedeck")]
#[command(version)]
#[command(about = "Generate cloze flashcard decks from marked sentences")]
#[command(long_about = "clozedeck reads sentences containing one **bold** word, translates them with an AI provider and packages them as an Anki deck.

EXAMPLES:
    clozedeck -t FR                          # Read the Notion page 'FR', translate to English
    clozedeck -t FR -c 10 -p openai          # Ten sentences, translated with OpenAI
    clozedeck -t HE --no-images              # Hebrew deck without images
    clozedeck -t FR --source local --topic verbs
                                             # Read pages/verbs.md instead of Notion
    clozedeck completions bash > clozedeck.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. Credentials are read from the environment or a
    .env file: NOTION_API_KEY, GEMINI_API_KEY, OPENAI_API_KEY,
    ANTHROPIC_API_KEY, GOOGLE_API_KEY, SEARCH_ENGINE_ID.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Language you already know (ISO 639-1, e.g. 'EN')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Language you are learning (e.g. 'FR', 'HE')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Maximum number of sentences to use
    #[arg(short, long)]
    count: Option<usize>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Document source to read sentences from
    #[arg(long, value_enum)]
    source: Option<CliSourceKind>,

    /// Page title or file stem to read (defaults to the target language code)
    #[arg(long)]
    topic: Option<String>,

    /// Skip image search
    #[arg(long)]
    no_images: bool,

    /// Output deck path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logger accepts everything; the max level is lowered once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "clozedeck", &mut std::io::stdout());
        return Ok(());
    }

    // A missing .env file is fine; credentials may come from the environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Failed to load .env file: {}", e);
        }
    }

    run_generate(cli).await
}

/// Load the configuration file, creating it with defaults when missing
fn load_config(config_path: &str) -> Result<Config> {
    if FileManager::file_exists(config_path) {
        FileManager::read_json(config_path).context(format!("Failed to load config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        FileManager::write_json(config_path, &config)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

/// Override config values with CLI options
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(count) = options.count {
        config.sentence_count = count;
    }

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        // Find the provider config and update the model
        let provider = config.translation.provider;
        let provider_str = provider.to_lowercase_string();
        match config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = app_config::ProviderConfig::new(provider);
                provider_config.model = model.clone();
                config.translation.available_providers.push(provider_config);
            }
        }
    }

    if let Some(source) = &options.source {
        config.source.kind = source.clone().into();
    }

    if options.no_images {
        config.images.enabled = false;
    }

    if let Some(output) = &options.output {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.output.directory = parent.to_string_lossy().to_string();
        }
        if let Some(filename) = output.file_name() {
            config.output.filename = filename.to_string_lossy().to_string();
        }
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_generate(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;
    let topic = options.topic.clone().unwrap_or_else(|| controller.default_topic());

    let report = controller.run(&topic).await?;
    if let Some(reason) = &report.images_skipped {
        info!("Images were not added: {}", reason);
    }
    info!(
        "Success: {} flashcard(s), {} image(s) -> {}",
        report.flashcards,
        report.images,
        report.output_path.display()
    );

    Ok(())
}
