use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::ImageError;
use super::{ImageFetch, ImageSearch, MAX_SEARCH_RESULTS};

/// Environment variable holding the Custom Search API key
pub const API_KEY_ENV_VAR: &str = "GOOGLE_API_KEY";

/// Environment variable holding the programmable search engine id
pub const ENGINE_ID_ENV_VAR: &str = "SEARCH_ENGINE_ID";

const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Search result page
#[derive(Debug, Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

impl SearchResponse {
    /// Image URLs in result order, ignoring items without one
    fn links(self) -> Vec<String> {
        self.items.into_iter().filter_map(|item| item.link).collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    link: Option<String>,
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Google Custom Search client restricted to image results
pub struct GoogleImageSearch {
    client: Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleImageSearch {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Client using credentials from the environment
    pub fn from_env(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self::new(
            std::env::var(API_KEY_ENV_VAR).unwrap_or_default(),
            std::env::var(ENGINE_ID_ENV_VAR).unwrap_or_default(),
            endpoint,
            timeout_secs,
        )
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.engine_id.is_empty()
    }

    fn url(&self) -> &str {
        if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            &self.endpoint
        }
    }
}

#[async_trait]
impl ImageSearch for GoogleImageSearch {
    async fn search(&self, query: &str, num: usize) -> Result<Vec<String>, ImageError> {
        if !self.has_credentials() {
            return Err(ImageError::MissingCredentials);
        }
        if num == 0 {
            return Err(ImageError::InvalidArgument("num must be > 0".to_string()));
        }
        let num = num.min(MAX_SEARCH_RESULTS).to_string();

        let response = self
            .client
            .get(self.url())
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("searchType", "image"),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ImageError::Request(format!("Failed to send search request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|err| err.error.message)
                .unwrap_or(body);
            error!("Image search error ({}): {}", status, message);
            return Err(ImageError::SearchFailed {
                status_code: status.as_u16(),
                message,
            });
        }

        let page = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| ImageError::Request(format!("Failed to parse search response: {}", e)))?;

        debug!("Image search for '{}' returned {} result(s)", query, page.items.len());
        Ok(page.links())
    }
}

/// Plain HTTP downloader
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ImageFetch for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Request(format!("{} returned {}", url, response.status())));
        }

        response.bytes().await.map_err(|e| ImageError::Request(e.to_string()))
    }
}
