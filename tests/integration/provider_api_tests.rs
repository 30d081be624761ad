/*!
 * Live API tests.
 *
 * These talk to the real services and are ignored by default. Run them with
 * `cargo test -- --ignored` after exporting the provider keys.
 */

use clozedeck::app_config::{TranslationConfig, TranslationProvider};
use clozedeck::images::{GoogleImageSearch, ImageSearch};
use clozedeck::selector::MarkedLine;
use clozedeck::translation::TranslationService;

fn has_env(var: &str) -> bool {
    std::env::var(var).map(|value| !value.is_empty()).unwrap_or(false)
}

async fn translate_with(provider: TranslationProvider) {
    let _ = dotenvy::dotenv();
    if !has_env(provider.api_key_env_var()) {
        eprintln!("Skipping: {} is not set", provider.api_key_env_var());
        return;
    }

    let service = TranslationService::new(TranslationConfig::default());
    let lines = vec![
        MarkedLine::parse("Je vais à l'**école** tous les jours.").unwrap(),
        MarkedLine::parse("Nous **mangeons** ensemble.").unwrap(),
    ];

    let items = service
        .translate(&lines, "English", &provider.to_lowercase_string(), None)
        .await
        .unwrap();

    assert!(!items.is_empty());
    for item in items {
        assert!(!item.words_source.is_empty());
        assert!(item.sentence_source.contains("**"));
    }
}

#[tokio::test]
#[ignore]
async fn test_gemini_translate_withLiveApi_shouldReturnRecords() {
    translate_with(TranslationProvider::Gemini).await;
}

#[tokio::test]
#[ignore]
async fn test_openai_translate_withLiveApi_shouldReturnRecords() {
    translate_with(TranslationProvider::OpenAI).await;
}

#[tokio::test]
#[ignore]
async fn test_anthropic_translate_withLiveApi_shouldReturnRecords() {
    translate_with(TranslationProvider::Anthropic).await;
}

#[tokio::test]
#[ignore]
async fn test_googleSearch_withLiveApi_shouldReturnImageUrls() {
    let _ = dotenvy::dotenv();
    let search = GoogleImageSearch::from_env("", 30);
    if !search.has_credentials() {
        eprintln!("Skipping: Google Custom Search credentials are not set");
        return;
    }

    let urls = search.search("school", 3).await.unwrap();

    assert!(!urls.is_empty());
    assert!(urls.len() <= 3);
}
