/*!
 * Tests for error types
 */

use clozedeck::errors::{AppError, DeckGenerationError, ImageError, ProviderError, SourceError, TranslationError};

#[test]
fn test_providerError_fromStatus_shouldClassify() {
    assert!(matches!(ProviderError::from_status(401, "bad key"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "forbidden"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "slow down"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_appError_shouldNameFailingStage() {
    let source: AppError = SourceError::PageNotFound("FR".to_string()).into();
    assert_eq!(source.to_string(), "Content source error: No page found with title: FR");

    let translation: AppError = TranslationError::EmptyResult.into();
    assert!(translation.to_string().starts_with("Translation error:"));

    let deck: AppError = DeckGenerationError::new("disk full").into();
    assert_eq!(deck.to_string(), "Deck error: Failed to write deck: disk full");
}

#[test]
fn test_sourceErrors_shouldBeDistinguishable() {
    let empty = SourceError::PageEmpty("FR".to_string());
    let missing = SourceError::PageNotFound("FR".to_string());
    assert_ne!(empty.to_string(), missing.to_string());

    let ambiguous = SourceError::AmbiguousTarget { title: "FR".to_string(), count: 2 };
    assert!(ambiguous.to_string().contains("2 matches"));
}

#[test]
fn test_translationError_fromProviderError_shouldKeepDiagnostic() {
    let error: TranslationError = ProviderError::AuthenticationError("Invalid API key".to_string()).into();
    assert!(error.to_string().contains("Invalid API key"));
}

#[test]
fn test_imageError_searchFailed_shouldIncludeApiMessage() {
    let error = ImageError::SearchFailed { status_code: 429, message: "Quota exceeded".to_string() };
    assert_eq!(error.to_string(), "Google Custom Search failed (429): Quota exceeded");
}
