/*!
 * Tests for application configuration functionality
 */

use clozedeck::app_config::{Config, LogLevel, ProviderConfig, SourceKind, TranslationConfig, TranslationProvider};
use clozedeck::errors::TranslationError;
use std::path::PathBuf;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "EN");
    assert_eq!(config.target_language, "FR");
    assert_eq!(config.sentence_count, 5);
    assert_eq!(config.source.kind, SourceKind::Notion);
    assert_eq!(config.translation.provider, TranslationProvider::Gemini);
    assert!(config.images.enabled);
    assert_eq!(config.images.per_query, 5);
    assert_eq!((config.images.box_width, config.images.box_height), (400, 180));
    assert_eq!(config.output_path(), PathBuf::from("output/flashcard_deck.apkg"));
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_default_models_shouldMatchProviders() {
    let config = TranslationConfig::default();
    assert_eq!(config.get_model(&TranslationProvider::Gemini), "gemini-2.5-flash");
    assert_eq!(config.get_model(&TranslationProvider::OpenAI), "gpt-4o");
    assert_eq!(config.available_providers.len(), TranslationProvider::ALL.len());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    // Invalid source language
    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "EN".to_string();

    // Target language without a deck
    config.target_language = "JA".to_string();
    assert!(config.validate().is_err());
    config.target_language = "he".to_string();
    assert!(config.validate().is_ok());

    config.sentence_count = 0;
    assert!(config.validate().is_err());
    config.sentence_count = 3;

    config.images.box_height = 0;
    assert!(config.validate().is_err());
    config.images.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    config.source.notion_endpoint = "api.notion.com".to_string();
    assert!(config.validate().is_err());

    // The Notion endpoint is irrelevant to local runs
    config.source.kind = SourceKind::Local;
    assert!(config.validate().is_ok());

    config.translation.available_providers[0].endpoint = "ftp://example.com".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_withModelContainingSpace_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    let mut provider = ProviderConfig::new(TranslationProvider::OpenAI);
    provider.model = "gpt 4o".to_string();
    config.translation.available_providers = vec![provider];

    assert!(config.validate().is_err());
}

#[test]
fn test_config_deserialization_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "target_language": "DE",
        "source": { "kind": "local", "local_directory": "notes" },
        "translation": {
            "provider": "openai",
            "available_providers": [{ "type": "openai", "model": "gpt-4o-mini" }]
        },
        "images": { "enabled": false }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.source_language, "EN");
    assert_eq!(config.target_language, "DE");
    assert_eq!(config.source.kind, SourceKind::Local);
    assert_eq!(config.source.local_directory, "notes");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.get_model(&TranslationProvider::OpenAI), "gpt-4o-mini");
    assert_eq!(config.translation.get_model(&TranslationProvider::Gemini), "gemini-2.5-flash");
    assert!(!config.images.enabled);
    assert_eq!(config.images.per_query, 5);
}

#[test]
fn test_config_serialization_shouldRoundTrip() {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back.target_language, config.target_language);
    assert_eq!(back.translation.available_providers.len(), 3);
}

#[test]
fn test_provider_fromStr_shouldResolveRegistryNames() {
    assert_eq!("openai".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert_eq!("Gemini".parse::<TranslationProvider>().unwrap(), TranslationProvider::Gemini);
    assert!(matches!(
        "ollama".parse::<TranslationProvider>(),
        Err(TranslationError::UnsupportedProvider(name)) if name == "ollama"
    ));
}

#[test]
fn test_get_api_key_withConfiguredKey_shouldPreferConfig() {
    let mut provider = ProviderConfig::new(TranslationProvider::OpenAI);
    provider.api_key = "sk-from-config".to_string();
    let config = TranslationConfig {
        available_providers: vec![provider],
        ..TranslationConfig::default()
    };
    assert_eq!(config.get_api_key(&TranslationProvider::OpenAI), "sk-from-config");
    assert_eq!(config.get_endpoint(&TranslationProvider::Anthropic), "https://api.anthropic.com");
}
