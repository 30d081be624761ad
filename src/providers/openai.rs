use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::ProviderError;
use super::{error_body, Provider};

/// OpenAI client for the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL (optional, defaults to the public API)
    endpoint: String,
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Structured output constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// OpenAI message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message; null when the model refuses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Refusal explanation sent instead of content
    #[serde(default, skip_serializing)]
    pub refusal: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,
    /// Number of completion tokens
    pub completion_tokens: u64,
    /// Total number of tokens
    pub total_tokens: u64,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    /// Generated message
    pub message: OpenAIMessage,
}

/// OpenAI chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
    /// Completion choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl OpenAIRequest {
    /// Create a new OpenAI request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            response_format: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
            refusal: None,
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Constrain the output to a strict JSON schema
    pub fn json_schema(mut self, name: &str, schema: Value) -> Self {
        self.response_format = Some(json!({
            "type": "json_schema",
            "json_schema": {
                "name": name,
                "strict": true,
                "schema": schema,
            }
        }));
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
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

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingCredential(
                "OPENAI_API_KEY environment variable is not set".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = error_body(response).await;
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))
    }

    fn extract_text(response: &OpenAIResponse) -> String {
        response
            .choices
            .first()
            .and_then(|choice| {
                if let Some(refusal) = &choice.message.refusal {
                    warn!("OpenAI refused the request: {}", refusal);
                }
                choice.message.content.clone()
            })
            .unwrap_or_default()
    }
}
