/*!
 * Tests for the translation service
 */

use std::sync::Arc;

use clozedeck::app_config::TranslationConfig;
use clozedeck::errors::{ProviderError, TranslationError};
use clozedeck::translation::{TranslationItem, TranslationService};
use crate::common;
use crate::common::mock_providers::{MockErrorType, MockTranslationBackend};

fn service_with(backend: MockTranslationBackend) -> (TranslationService, Arc<MockTranslationBackend>) {
    let backend = Arc::new(backend);
    let service = TranslationService::with_backend(TranslationConfig::default(), backend.clone());
    (service, backend)
}

#[tokio::test]
async fn test_translate_withValidLines_shouldSendOneJoinedRequest() {
    let (service, backend) = service_with(MockTranslationBackend::returning(common::sample_items()));
    let lines = ["Je vais à l'**école** tous les jours.", "C'est une **bonne** amie."];

    let items = service.translate(&lines, "English", "gemini", None).await.unwrap();

    assert_eq!(items, common::sample_items());
    let tracker = backend.tracker();
    let tracker = tracker.lock();
    assert_eq!(tracker.call_count, 1);
    assert_eq!(
        tracker.last_request.as_deref(),
        Some("Je vais à l'**école** tous les jours.\nC'est une **bonne** amie.")
    );
}

#[tokio::test]
async fn test_translate_withEmptyInput_shouldFailWithoutCallingProvider() {
    let (service, backend) = service_with(MockTranslationBackend::returning(common::sample_items()));
    let lines: [&str; 0] = [];

    let result = service.translate(&lines, "English", "gemini", None).await;

    assert!(matches!(result, Err(TranslationError::EmptyInput)));
    assert_eq!(backend.tracker().lock().call_count, 0);
}

#[tokio::test]
async fn test_translate_withUnknownProvider_shouldFailWithoutCallingProvider() {
    let (service, backend) = service_with(MockTranslationBackend::returning(common::sample_items()));

    let result = service.translate(&["a **b**"], "English", "deepl", None).await;

    match result {
        Err(TranslationError::UnsupportedProvider(name)) => assert_eq!(name, "deepl"),
        other => panic!("Expected UnsupportedProvider, got {:?}", other),
    }
    assert_eq!(backend.tracker().lock().call_count, 0);
}

#[tokio::test]
async fn test_translate_withBlankModel_shouldFailWithoutCallingProvider() {
    let (service, backend) = service_with(MockTranslationBackend::returning(common::sample_items()));

    let result = service.translate(&["a **b**"], "English", "openai", Some("  ")).await;

    assert!(matches!(result, Err(TranslationError::UnsupportedModel(_))));
    assert_eq!(backend.tracker().lock().call_count, 0);
}

#[tokio::test]
async fn test_translate_withProviderNameInAnyCase_shouldResolve() {
    let (service, _backend) = service_with(MockTranslationBackend::returning(common::sample_items()));
    for name in ["OpenAI", "GEMINI", " anthropic "] {
        assert!(service.translate(&["a **b**"], "English", name, None).await.is_ok());
    }
}

#[tokio::test]
async fn test_translate_withEmptyProviderResult_shouldFailAsEmptyResult() {
    let (service, backend) = service_with(MockTranslationBackend::returning(Vec::new()));

    let result = service.translate(&["a **b**"], "English", "gemini", None).await;

    assert!(matches!(result, Err(TranslationError::EmptyResult)));
    assert!(!matches!(result, Err(TranslationError::Provider(_))));
    assert_eq!(backend.tracker().lock().call_count, 1);
}

#[tokio::test]
async fn test_translate_withProviderFailure_shouldCarryProviderError() {
    for (error_type, expected) in [
        (MockErrorType::Auth, "Invalid API key"),
        (MockErrorType::Connection, "Connection failed"),
        (MockErrorType::RateLimit, "Rate limit exceeded"),
    ] {
        let (service, _backend) = service_with(MockTranslationBackend::failing(error_type));
        let result = service.translate(&["a **b**"], "English", "openai", None).await;

        match result {
            Err(TranslationError::Provider(error)) => assert!(error.to_string().contains(expected)),
            other => panic!("Expected provider error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_translate_withMissingCredential_shouldFailBeforeNetwork() {
    let mut config = TranslationConfig::default();
    for provider in config.available_providers.iter_mut() {
        provider.api_key.clear();
        provider.endpoint = "http://127.0.0.1:9".to_string();
    }
    // SAFETY: tests in this binary do not read this variable concurrently
    unsafe { std::env::remove_var("ANTHROPIC_API_KEY") };
    let service = TranslationService::new(config);

    let result = service.translate(&["a **b**"], "English", "anthropic", None).await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::MissingCredential(_)))
    ));
}

#[test]
fn test_instructions_shouldNameSourceLanguage() {
    let service = TranslationService::new(TranslationConfig::default());
    let instructions = service.instructions("Persian");
    assert!(instructions.contains("natural Persian"));
    assert!(instructions.contains("\"translations\""));
}

#[test]
fn test_translationItem_shouldDeserializeFromProviderJson() {
    let json = r#"{"words_source": "school, schoolhouse", "sentence_source": "I go to **school**.", "sentence_target": "Je vais à l'**école**."}"#;
    let item: TranslationItem = serde_json::from_str(json).unwrap();
    assert_eq!(item.words_source, "school, schoolhouse");
}
