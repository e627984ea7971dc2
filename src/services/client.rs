//! Remote collaborators of the workflow.
//!
//! [`BookAnalysisBackend`] is the seam between the session and the book
//! analysis service. [`HttpBackend`] talks to the real service over HTTP;
//! tests substitute a scripted implementation.

use crate::error::{BookAnalysisError, Result};
use crate::types::{AnalysisResult, AnalyzeRequest, BackendConfig, SplitRequest, SplitResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

const SPLIT_PATH: &str = "book-analysis/split";
const ANALYZE_PATH: &str = "book-analysis/analyze";
const PROJECTS_PATH: &str = "projects";

#[async_trait]
pub trait BookAnalysisBackend: Send + Sync {
    /// Splits the content into chapter previews.
    async fn split(&self, request: &SplitRequest) -> Result<SplitResult>;

    /// Runs the analysis over the requested chapter range.
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult>;

    /// Lists projects. The payload shape varies between backend versions,
    /// so it is returned raw and normalized by the catalog.
    async fn list_projects(&self) -> Result<serde_json::Value>;
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let started_at = Instant::now();
        debug!("POST {}", url);

        let mut request = self.client.post(url.clone()).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = Self::check_status(request.send().await?).await?;
        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| Self::invalid_json(url.path(), e))?;

        debug!(
            "POST {} completed in {}ms",
            url.path(),
            started_at.elapsed().as_millis()
        );
        Ok(parsed)
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let url_path = url.path().to_string();
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = Self::check_status(request.send().await?).await?;
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Self::invalid_json(&url_path, e))
    }

    fn invalid_json(path: &str, error: reqwest::Error) -> BookAnalysisError {
        BookAnalysisError::InvalidResponse {
            reason: format!("{} returned unexpected JSON: {}", path, error),
        }
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BookAnalysisError::HttpStatus {
            status: status.as_u16(),
            detail: Self::extract_detail(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
        })
    }

    /// Pulls the `detail` message out of an error body. Validation errors
    /// carry a list of objects instead of a string.
    fn extract_detail(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(detail) => Some(detail.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| item.to_string())
                    })
                    .collect();
                Some(messages.join("; "))
            }
            other => Some(other.to_string()),
        }
    }
}

#[async_trait]
impl BookAnalysisBackend for HttpBackend {
    async fn split(&self, request: &SplitRequest) -> Result<SplitResult> {
        info!(
            "Requesting chapter split ({} chars, min chapter length {})",
            request.content.chars().count(),
            request.min_chapter_length
        );
        self.post_json(SPLIT_PATH, request).await
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        info!(
            "Requesting analysis of chapters {}-{} (max {} chars, embedding: {})",
            request.start_chapter, request.end_chapter, request.max_chars, request.enable_embedding
        );
        self.post_json(ANALYZE_PATH, request).await
    }

    async fn list_projects(&self) -> Result<serde_json::Value> {
        self.get_json(PROJECTS_PATH).await
    }
}
