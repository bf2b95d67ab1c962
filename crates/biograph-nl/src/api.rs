//! Blocking REST client for the recognition and graph-fetch endpoints.
//!
//! Wire contracts:
//! - `POST {base}/v1/bulk/property/values/out` with
//!   `{"nodes": [...], "property": "typeOf"}` → `{"data": [{"dcid": ...,
//!   "values": [TypeRecord]}]}`
//! - `GET {base}/v1/recognize/entities?query=...` →
//!   `{"entities": [RecognizedSpan]}`
//!
//! No retries or backoff at this layer; HTTP and decode failures map to
//! [`RecognitionError`] variants and propagate to the caller.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::services::{EntityRecognizer, RecognitionError, TypeFetcher};
use crate::{RecognizedSpan, TypeRecord};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded from the environment or built directly.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load from `BIOGRAPH_API_URL` (required) and `BIOGRAPH_API_KEY`
    /// (optional).
    pub fn from_env() -> Result<Self, RecognitionError> {
        let base_url = std::env::var("BIOGRAPH_API_URL")
            .map_err(|_| RecognitionError::Config("BIOGRAPH_API_URL is not set".to_string()))?;
        let mut config = Self::new(&base_url);
        config.api_key = std::env::var("BIOGRAPH_API_KEY").ok();
        Ok(config)
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Blocking HTTP client implementing both collaborator traits.
pub struct GraphApiClient {
    client: Client,
    config: ApiConfig,
}

impl GraphApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, RecognitionError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| {
                RecognitionError::Config("API key contains invalid header characters".to_string())
            })?;
            headers.insert("x-api-key", value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecognitionError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, RecognitionError> {
        Self::new(ApiConfig::from_env()?)
    }
}

#[derive(Debug, Deserialize)]
struct PropertyValuesResponse {
    #[serde(default)]
    data: Vec<NodeValues>,
}

#[derive(Debug, Deserialize)]
struct NodeValues {
    dcid: String,
    #[serde(default)]
    values: Vec<TypeRecord>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    entities: Vec<RecognizedSpan>,
}

fn check_status(resp: Response) -> Result<Response, RecognitionError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().unwrap_or_default();
    Err(RecognitionError::Api { status, message })
}

impl TypeFetcher for GraphApiClient {
    fn raw_property_values(
        &self,
        dcids: &[String],
        relation: &str,
    ) -> Result<HashMap<String, Vec<TypeRecord>>, RecognitionError> {
        let url = format!("{}/v1/bulk/property/values/out", self.config.base_url);
        debug!(%url, nodes = dcids.len(), relation, "fetching property values");

        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "nodes": dcids, "property": relation }))
            .send()
            .map_err(|e| RecognitionError::Network(e.to_string()))?;
        let resp = check_status(resp)?;

        let body: PropertyValuesResponse = resp
            .json()
            .map_err(|e| RecognitionError::InvalidResponse(e.to_string()))?;
        Ok(body
            .data
            .into_iter()
            .map(|node| (node.dcid, node.values))
            .collect())
    }
}

impl EntityRecognizer for GraphApiClient {
    fn recognize_entities(&self, query: &str) -> Result<Vec<RecognizedSpan>, RecognitionError> {
        let url = format!("{}/v1/recognize/entities", self.config.base_url);
        debug!(%url, query, "recognizing entities");

        let resp = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .map_err(|e| RecognitionError::Network(e.to_string()))?;
        let resp = check_status(resp)?;

        let body: RecognizeResponse = resp
            .json()
            .map_err(|e| RecognitionError::InvalidResponse(e.to_string()))?;
        Ok(body.entities)
    }
}
