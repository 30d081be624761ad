/*!
 * Error types for the clozedeck application.
 *
 * Each pipeline boundary has its own error enum, defined with the thiserror
 * crate. `AppError` wraps them and names the stage that failed.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No credential was configured for a provider that needs one
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Map a reqwest transport error
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while resolving and reading the document source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The topic identifier resolved to nothing
    #[error("No page found with title: {0}")]
    PageNotFound(String),

    /// The topic exists but has no line with a marked span
    #[error("Page '{0}' contains no usable content with **bold** text")]
    PageEmpty(String),

    /// The topic identifier matched more than one candidate
    #[error("Multiple pages found with title '{title}' ({count} matches). Please ensure titles are unique")]
    AmbiguousTarget {
        /// Requested title
        title: String,
        /// Number of matching candidates
        count: usize,
    },

    /// A maximum count of zero was requested
    #[error("Sentence count must be greater than zero")]
    InvalidCount,

    /// Missing API key or similar
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Transport or API failure while talking to the source
    #[error("Source request failed: {0}")]
    Request(String),

    /// Failure reading a local source file
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Nothing to translate
    #[error("No sentences provided for translation")]
    EmptyInput,

    /// Provider name is not in the registry
    #[error("Unsupported translation API: {0}")]
    UnsupportedProvider(String),

    /// Model name rejected before any request
    #[error("Unsupported model name: '{0}'")]
    UnsupportedModel(String),

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Provider answered but produced no translations
    #[error("Translation service returned empty output")]
    EmptyResult,
}

/// Errors raised by the markup transformer
#[derive(Error, Debug, PartialEq)]
pub enum MarkupError {
    /// Destination dialect name is unknown
    #[error("Unsupported format type: {0}")]
    UnsupportedDialect(String),
}

/// Errors raised while acquiring images
#[derive(Error, Debug)]
pub enum ImageError {
    /// Search credentials are not configured
    #[error("Missing Google Custom Search credentials. Set GOOGLE_API_KEY and SEARCH_ENGINE_ID environment variables")]
    MissingCredentials,

    /// A count argument was zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The search API failed
    #[error("Google Custom Search failed ({status_code}): {message}")]
    SearchFailed {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Transport failure
    #[error("Image request failed: {0}")]
    Request(String),

    /// Image bytes could not be decoded or encoded
    #[error("Image processing failed: {0}")]
    Decode(String),

    /// File system failure
    #[error("Image file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Deck serialization failure, whatever the underlying cause
#[derive(Error, Debug)]
#[error("Failed to write deck: {message}")]
pub struct DeckGenerationError {
    /// Description of the underlying failure
    pub message: String,
}

impl DeckGenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<std::io::Error> for DeckGenerationError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error.to_string())
    }
}

impl From<rusqlite::Error> for DeckGenerationError {
    fn from(error: rusqlite::Error) -> Self {
        Self::new(error.to_string())
    }
}

impl From<zip::result::ZipError> for DeckGenerationError {
    fn from(error: zip::result::ZipError) -> Self {
        Self::new(error.to_string())
    }
}

impl From<serde_json::Error> for DeckGenerationError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Main application error type naming the stage that failed
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Content selection failed
    #[error("Content source error: {0}")]
    Source(#[from] SourceError),

    /// Translation failed
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Deck packaging failed
    #[error("Deck error: {0}")]
    Deck(#[from] DeckGenerationError),

    /// Configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Config(error.to_string())
    }
}
