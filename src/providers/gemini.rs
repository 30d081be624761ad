use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::ProviderError;
use super::{error_body, Provider};

/// Gemini client for the `generateContent` API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL (optional, defaults to the public API)
    endpoint: String,
}

/// A run of text inside a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

/// A content block (user turn, model turn or system instruction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Thinking budget settings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

/// Generation settings, including the structured output constraint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

/// Gemini generate request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// Model name, sent in the URL rather than the body
    #[serde(skip)]
    model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,

    contents: Vec<GeminiContent>,

    generation_config: GenerationConfig,
}

/// Token usage information
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

/// One generated candidate
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

/// Gemini generate response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GeminiRequest {
    /// Create a new request with one user turn
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: None,
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: input.into() }],
            }],
            generation_config: GenerationConfig {
                temperature: None,
                response_mime_type: None,
                response_schema: None,
                thinking_config: None,
            },
        }
    }

    /// Set the system instruction
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: system.into() }],
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    /// Constrain the output to JSON matching `schema`
    pub fn json_schema(mut self, schema: Value) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self.generation_config.response_schema = Some(schema);
        self
    }

    /// Set the thinking budget (0 disables thinking)
    pub fn thinking_budget(mut self, budget: u32) -> Self {
        self.generation_config.thinking_config = Some(ThinkingConfig { thinking_budget: budget });
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self, model: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com/v1beta"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/models/{}:generateContent", base, model)
    }
}

#[async_trait]
impl Provider for Gemini {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredential(
                "GEMINI_API_KEY environment variable is not set".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.api_url(request.model()))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = error_body(response).await;
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    fn extract_text(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter().map(|part| part.text.as_str()).collect())
            .unwrap_or_default()
    }
}
