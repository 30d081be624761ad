/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which validates a request,
 * resolves the provider by name, renders the instructions, dispatches one
 * request and normalizes the outcome into `TranslationError`s.
 */

use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::gemini::{Gemini, GeminiRequest};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;
use super::prompts::{response_schema, PromptTemplate, SchemaFlavor};
use super::{TranslationItem, TranslationResponse};

/// Name given to the structured output schema / tool
const SCHEMA_NAME: &str = "translation_response";

/// Capability every translation backend offers: instructions and input in,
/// structured records out.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn generate(&self, instructions: &str, input: &str) -> Result<Vec<TranslationItem>, ProviderError>;
}

/// Translation provider implementation variants
enum TranslationProviderImpl {
    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
        model: String,
        temperature: f32,
    },

    /// Google Gemini API service
    Gemini {
        /// Client instance
        client: Gemini,
        model: String,
        temperature: f32,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
        model: String,
        temperature: f32,
        max_tokens: u32,
    },
}

impl TranslationProviderImpl {
    fn from_config(provider: TranslationProvider, config: &TranslationConfig, model: String) -> Self {
        let api_key = config.get_api_key(&provider);
        let endpoint = config.get_endpoint(&provider);
        let timeout_secs = config.get_timeout_secs(&provider);
        let temperature = config.common.temperature;

        match provider {
            TranslationProvider::OpenAI => Self::OpenAI {
                client: OpenAI::new(api_key, endpoint, timeout_secs),
                model,
                temperature,
            },
            TranslationProvider::Gemini => Self::Gemini {
                client: Gemini::new(api_key, endpoint, timeout_secs),
                model,
                temperature,
            },
            TranslationProvider::Anthropic => Self::Anthropic {
                client: Anthropic::new(api_key, endpoint, timeout_secs),
                model,
                temperature,
                max_tokens: config.common.max_tokens,
            },
        }
    }
}

#[async_trait]
impl TranslationBackend for TranslationProviderImpl {
    async fn generate(&self, instructions: &str, input: &str) -> Result<Vec<TranslationItem>, ProviderError> {
        let text = match self {
            Self::OpenAI { client, model, temperature } => {
                let request = OpenAIRequest::new(model.as_str())
                    .add_message("system", instructions)
                    .add_message("user", input)
                    .temperature(*temperature)
                    .json_schema(SCHEMA_NAME, response_schema(SchemaFlavor::Strict));

                let response = client.complete(request).await?;
                if let Some(usage) = &response.usage {
                    debug!("OpenAI usage: {} prompt / {} completion tokens", usage.prompt_tokens, usage.completion_tokens);
                }
                OpenAI::extract_text(&response)
            }
            Self::Gemini { client, model, temperature } => {
                let request = GeminiRequest::new(model.as_str(), input)
                    .system(instructions)
                    .temperature(*temperature)
                    .thinking_budget(0)
                    .json_schema(response_schema(SchemaFlavor::OpenApi));

                let response = client.complete(request).await?;
                if let Some(usage) = &response.usage_metadata {
                    debug!("Gemini usage: {} prompt / {} completion tokens", usage.prompt_token_count, usage.candidates_token_count);
                }
                Gemini::extract_text(&response)
            }
            Self::Anthropic { client, model, temperature, max_tokens } => {
                let request = AnthropicRequest::new(model.as_str(), *max_tokens)
                    .system(instructions)
                    .add_message("user", input)
                    .temperature(*temperature)
                    .forced_tool(SCHEMA_NAME, "Record the translations", response_schema(SchemaFlavor::Strict));

                let response = client.complete(request).await?;
                debug!("Anthropic usage: {} input / {} output tokens", response.usage.input_tokens, response.usage.output_tokens);
                Anthropic::extract_text(&response)
            }
        };

        parse_translations(&text)
    }
}

/// Decode a structured answer, tolerating a surrounding Markdown code fence
pub fn parse_translations(text: &str) -> Result<Vec<TranslationItem>, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<TranslationResponse>(body)
        .map(|response| response.translations)
        .map_err(|e| ProviderError::ParseError(format!("Response does not match the translation schema: {}", e)))
}

/// Main translation service for marked sentences
pub struct TranslationService {
    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Instruction template
    template: PromptTemplate,

    /// Backend used instead of the configured provider clients
    backend_override: Option<Arc<dyn TranslationBackend>>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Self {
        Self {
            config,
            template: PromptTemplate::default(),
            backend_override: None,
        }
    }

    /// Create a service whose requests all go to `backend`.
    ///
    /// Provider and model names are still validated against the registry.
    pub fn with_backend(config: TranslationConfig, backend: Arc<dyn TranslationBackend>) -> Self {
        Self {
            config,
            template: PromptTemplate::default(),
            backend_override: Some(backend),
        }
    }

    /// Render the instructions for a source language name
    pub fn instructions(&self, source_language: &str) -> String {
        self.template.render(source_language)
    }

    /// Translate marked lines in a single provider round trip.
    ///
    /// # Arguments
    /// * `lines` - Marked sentences in the target language
    /// * `source_language` - Name of the language to translate into (e.g. "English")
    /// * `provider_name` - Registry name of the provider ("gemini", "openai", "anthropic")
    /// * `model` - Model override; the provider's configured model when `None`
    ///
    /// # Errors
    /// Fails before any request on empty input or an unknown provider/model,
    /// with `TranslationError::Provider` when the request fails and with
    /// `TranslationError::EmptyResult` when the provider returns no records.
    pub async fn translate<S: AsRef<str>>(
        &self,
        lines: &[S],
        source_language: &str,
        provider_name: &str,
        model: Option<&str>,
    ) -> Result<Vec<TranslationItem>, TranslationError> {
        if lines.is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let provider: TranslationProvider = provider_name.parse()?;
        // Configured models get the same check as explicit overrides
        let model = match model {
            Some(name) => name.to_string(),
            None => self.config.get_model(&provider),
        };
        if model.trim().is_empty() || model.chars().any(char::is_whitespace) {
            return Err(TranslationError::UnsupportedModel(model));
        }

        let instructions = self.instructions(source_language);
        let input = lines.iter().map(|line| line.as_ref()).collect::<Vec<_>>().join("\n");

        info!(
            "Translating {} sentence(s) into {} with {} ({})",
            lines.len(),
            source_language,
            provider.display_name(),
            model
        );

        let items = match &self.backend_override {
            Some(backend) => backend.generate(&instructions, &input).await?,
            None => {
                TranslationProviderImpl::from_config(provider, &self.config, model)
                    .generate(&instructions, &input)
                    .await?
            }
        };

        if items.is_empty() {
            return Err(TranslationError::EmptyResult);
        }

        Ok(items)
    }
}
