use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::str::FromStr;
use url::Url;

use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language the learner already knows (e.g. "EN")
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language being studied; also the page title to read (e.g. "FR")
    pub target_language: String,

    /// Maximum number of sentences per run
    #[serde(default = "default_sentence_count")]
    pub sentence_count: usize,

    /// Document source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Image enrichment settings
    #[serde(default)]
    pub images: ImageConfig,

    /// Output file settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl TranslationProvider {
    /// Every registered provider
    pub const ALL: [TranslationProvider; 3] = [Self::Gemini, Self::OpenAI, Self::Anthropic];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> String {
        match self {
            Self::Gemini => default_gemini_model(),
            Self::OpenAI => default_openai_model(),
            Self::Anthropic => default_anthropic_model(),
        }
    }

    pub fn default_endpoint(&self) -> String {
        match self {
            Self::Gemini => default_gemini_endpoint(),
            Self::OpenAI => default_openai_endpoint(),
            Self::Anthropic => default_anthropic_endpoint(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// The provider registry: names resolve here or nowhere
impl FromStr for TranslationProvider {
    type Err = TranslationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(TranslationError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key (falls back to the provider's environment variable)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: provider_type.default_model(),
            api_key: String::new(),
            endpoint: provider_type.default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token limit, for providers that require one
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Where sentences are read from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Notion,
    Local,
}

/// Document source settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Directory searched by the local source
    #[serde(default = "default_local_directory")]
    pub local_directory: String,

    /// Notion API base URL
    #[serde(default = "default_notion_endpoint")]
    pub notion_endpoint: String,

    /// Notion integration token (falls back to NOTION_API_KEY)
    #[serde(default = "String::new")]
    pub notion_api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            local_directory: default_local_directory(),
            notion_endpoint: default_notion_endpoint(),
            notion_api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    /// Configured token, or the NOTION_API_KEY environment variable
    pub fn get_notion_api_key(&self) -> String {
        key_or_env(&self.notion_api_key, "NOTION_API_KEY")
    }
}

/// Image enrichment settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Images kept per flashcard
    #[serde(default = "default_images_per_query")]
    pub per_query: usize,

    /// Bounding box images are shrunk into
    #[serde(default = "default_box_width")]
    pub box_width: u32,

    #[serde(default = "default_box_height")]
    pub box_height: u32,

    /// Custom Search API URL
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Per-request timeout for searches and downloads
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_query: default_images_per_query(),
            box_width: default_box_width(),
            box_height: default_box_height(),
            search_endpoint: default_search_endpoint(),
            timeout_secs: default_image_timeout_secs(),
        }
    }
}

/// Output file settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,

    #[serde(default = "default_output_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            filename: default_output_filename(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "EN".to_string()
}

fn default_sentence_count() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_true() -> bool {
    true
}

fn default_local_directory() -> String {
    "pages".to_string()
}

fn default_notion_endpoint() -> String {
    "https://api.notion.com".to_string()
}

fn default_images_per_query() -> usize {
    5
}

fn default_box_width() -> u32 {
    400
}

fn default_box_height() -> u32 {
    180
}

fn default_search_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_image_timeout_secs() -> u64 {
    5
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_output_filename() -> String {
    "flashcard_deck.apkg".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

/// Configured value when present, environment variable otherwise
fn key_or_env(configured: &str, env_var: &str) -> String {
    if !configured.is_empty() {
        return configured.to_string();
    }
    std::env::var(env_var).unwrap_or_default()
}

/// Endpoints must be absolute http(s) URLs
fn validate_endpoint(name: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).map_err(|e| anyhow!("Invalid {} endpoint '{}': {}", name, endpoint, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("Invalid {} endpoint '{}': expected http or https", name, endpoint));
    }
    if url.host_str().is_none() {
        return Err(anyhow!("Invalid {} endpoint '{}': missing host", name, endpoint));
    }
    Ok(())
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = language_utils::get_language_name(&self.source_language)?;
        let _deck_name = language_utils::deck_name(&self.target_language)?;

        if self.sentence_count == 0 {
            return Err(anyhow!("Sentence count must be greater than zero"));
        }

        if self.images.enabled {
            if self.images.per_query == 0 {
                return Err(anyhow!("Images per query must be greater than zero"));
            }
            if self.images.box_width == 0 || self.images.box_height == 0 {
                return Err(anyhow!(
                    "Image box must be non-empty, got {}x{}",
                    self.images.box_width,
                    self.images.box_height
                ));
            }
        }

        if self.output.filename.trim().is_empty() {
            return Err(anyhow!("Output filename cannot be empty"));
        }

        let model = self.translation.get_model(&self.translation.provider);
        if model.chars().any(char::is_whitespace) {
            return Err(TranslationError::UnsupportedModel(model).into());
        }

        if self.source.kind == SourceKind::Notion {
            validate_endpoint("Notion", &self.source.notion_endpoint)?;
        }
        if self.images.enabled {
            validate_endpoint("image search", &self.images.search_endpoint)?;
        }
        for provider in &self.translation.available_providers {
            if !provider.endpoint.is_empty() {
                validate_endpoint(&provider.provider_type, &provider.endpoint)?;
            }
        }

        Ok(())
    }

    /// Path of the deck file this run writes
    pub fn output_path(&self) -> std::path::PathBuf {
        FileManager::deck_output_path(&self.output.directory, &self.output.filename)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: "FR".to_string(),
            sentence_count: default_sentence_count(),
            source: SourceConfig::default(),
            translation: TranslationConfig::default(),
            images: ImageConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for a provider
    pub fn get_model(&self, provider: &TranslationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider) {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        provider.default_model()
    }

    /// Get the API key for a provider, falling back to its environment variable
    pub fn get_api_key(&self, provider: &TranslationProvider) -> String {
        let configured = self
            .get_provider_config(provider)
            .map(|p| p.api_key.as_str())
            .unwrap_or_default();
        key_or_env(configured, provider.api_key_env_var())
    }

    /// Get the endpoint for a provider
    pub fn get_endpoint(&self, provider: &TranslationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider) {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        provider.default_endpoint()
    }

    /// Get the request timeout for a provider
    pub fn get_timeout_secs(&self, provider: &TranslationProvider) -> u64 {
        self.get_provider_config(provider)
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: TranslationProvider::ALL
                .iter()
                .map(|provider| ProviderConfig::new(*provider))
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
