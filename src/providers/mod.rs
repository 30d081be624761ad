/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: chat completions with a strict JSON schema
 * - Gemini: Google `generateContent` with a response schema
 * - Anthropic: messages API with a forced tool call
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract the structured JSON payload from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Read a failed response's body for the error message
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string())
}

pub mod anthropic;
pub mod gemini;
pub mod openai;
