use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::errors::SourceError;
use super::ContentSource;

/// Notion API version sent with every request
const NOTION_VERSION: &str = "2022-06-28";

/// Maximum page size accepted by the block children endpoint
const PAGE_SIZE: u32 = 100;

/// Notion client reading sentences from a page's top-level blocks
pub struct NotionSource {
    /// HTTP client for API requests
    client: Client,
    /// Integration token
    api_key: String,
    /// API base URL
    endpoint: String,
}

impl NotionSource {
    /// Create a new Notion source
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

    fn url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.notion.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1/{}", base, path)
    }

    fn ensure_credential(&self) -> Result<(), SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::MissingCredential(
                "NOTION_API_KEY environment variable is not set".to_string(),
            ));
        }
        Ok(())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, SourceError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| SourceError::Request(format!("Failed to send request to Notion API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Notion API error ({}): {}", status, error_text);
            return Err(SourceError::Request(format!("Notion API error ({}): {}", status, error_text)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Request(format!("Failed to parse Notion API response: {}", e)))
    }

    /// Resolve a page id from its exact title
    pub async fn find_page_id(&self, title: &str) -> Result<String, SourceError> {
        self.ensure_credential()?;

        let body = json!({
            "query": title,
            "filter": { "value": "page", "property": "object" },
        });
        let response = self.send(self.client.post(self.url("search")).json(&body)).await?;
        let results = response
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        select_page_id(results, title)
    }

    /// Fetch every top-level block of a page, following pagination
    async fn list_blocks(&self, page_id: &str) -> Result<Vec<Value>, SourceError> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("page_size", PAGE_SIZE.to_string())];
            if let Some(start) = &cursor {
                query.push(("start_cursor", start.clone()));
            }

            let url = self.url(&format!("blocks/{}/children", page_id));
            let response = self.send(self.client.get(url).query(&query)).await?;

            if let Some(results) = response.get("results").and_then(Value::as_array) {
                blocks.extend(results.iter().cloned());
            }

            let has_more = response.get("has_more").and_then(Value::as_bool).unwrap_or(false);
            cursor = response
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string);

            if !has_more || cursor.is_none() {
                break;
            }
            debug!("Fetching next block page for {}", page_id);
        }

        Ok(blocks)
    }
}

#[async_trait]
impl ContentSource for NotionSource {
    fn name(&self) -> &str {
        "Notion"
    }

    async fn fetch_lines(&self, topic: &str) -> Result<Vec<String>, SourceError> {
        let page_id = self.find_page_id(topic).await?;
        let blocks = self.list_blocks(&page_id).await?;
        Ok(blocks.iter().map(block_text).collect())
    }
}

/// Pick the single search result whose title equals `title`
pub fn select_page_id(results: &[Value], title: &str) -> Result<String, SourceError> {
    let matches: Vec<&str> = results
        .iter()
        .filter(|result| extract_page_title(result).as_deref() == Some(title))
        .filter_map(|result| result.get("id").and_then(Value::as_str))
        .collect();

    match matches.as_slice() {
        [] => Err(SourceError::PageNotFound(title.to_string())),
        [id] => Ok((*id).to_string()),
        _ => Err(SourceError::AmbiguousTarget {
            title: title.to_string(),
            count: matches.len(),
        }),
    }
}

/// Plain-text title of a Notion page object
pub fn extract_page_title(page: &Value) -> Option<String> {
    page.get("properties")?
        .as_object()?
        .values()
        .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
        .and_then(|prop| prop.get("title")?.as_array()?.first()?.get("plain_text")?.as_str())
        .map(str::to_string)
}

/// Text of one block with bold runs wrapped in `**`
pub fn block_text(block: &Value) -> String {
    let fragments = block
        .get("type")
        .and_then(Value::as_str)
        .and_then(|block_type| block.get(block_type))
        .and_then(|content| content.get("rich_text"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    format_rich_text(fragments)
}

/// Convert rich text fragments to emphasis-marked text.
///
/// Consecutive bold fragments form one span.
pub fn format_rich_text(fragments: &[Value]) -> String {
    let mut text = String::new();
    let mut in_bold = false;

    for fragment in fragments {
        let plain = fragment.get("plain_text").and_then(Value::as_str).unwrap_or_default();
        let bold = fragment
            .pointer("/annotations/bold")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if bold != in_bold {
            text.push_str("**");
            in_bold = bold;
        }
        text.push_str(plain);
    }

    if in_bold {
        text.push_str("**");
    }
    text
}
