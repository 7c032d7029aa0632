//! Read-only client for the WordPress-compatible content source.
//!
//! No authentication; pagination totals arrive in the `X-WP-TotalPages`
//! response header. The client itself does not retry — callers opt in via
//! [`retry_fixed`] (2 retries, fixed delay).

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiErrorKind};
use crate::models::{Category, Post};

/// Request timeout for content fetches.
const CONTENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the total page count.
const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

/// Automatic retries applied by [`retry_fixed`].
const RETRY_ATTEMPTS: u32 = 2;
/// Fixed delay between retries.
const RETRY_DELAY: Duration = Duration::from_millis(800);

/// One fetched page of posts plus the source's total page count.
#[derive(Debug, Clone)]
pub struct PostsPage {
    pub posts: Vec<Post>,
    pub total_pages: u32,
}

/// Content source client.
#[derive(Debug, Clone)]
pub struct ContentClient {
    base_url: String,
    http: reqwest::Client,
}

impl ContentClient {
    /// Creates a content client against the given wp/v2 REST root.
    pub fn new(base_url: impl Into<String>) -> Self {
        // Same failure behavior as reqwest::Client::new(): only fails if the
        // TLS backend cannot initialize.
        let http = reqwest::Client::builder()
            .timeout(CONTENT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Fetches one page of posts with the embedded envelope.
    pub async fn list_posts(&self, page: u32, per_page: u32) -> Result<PostsPage, ApiError> {
        let url = format!(
            "{}/posts?_embed=true&per_page={per_page}&page={page}",
            self.base_url
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let posts = parse_json(response).await?;
        Ok(PostsPage { posts, total_pages })
    }

    /// Fetches a single post by id.
    pub async fn get_post(&self, id: u64) -> Result<Post, ApiError> {
        let url = format!("{}/posts/{id}?_embed=true", self.base_url);
        self.get_json(&url).await
    }

    /// Fetches all categories (the source caps a page at 100).
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = format!("{}/categories?per_page=100", self.base_url);
        self.get_json(&url).await
    }

    /// Fetches the first `limit` most-recent posts (the "fresh" rail).
    pub async fn fresh_posts(&self, limit: u32) -> Result<Vec<Post>, ApiError> {
        Ok(self.list_posts(1, limit).await?.posts)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        parse_json(response).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_reqwest(&e))?;
    serde_json::from_str(&body)
        .map_err(|e| ApiError::new(ApiErrorKind::Parse, format!("Failed to parse response: {e}")))
}

/// Runs a content fetch with the query-layer retry policy:
/// up to 2 retries with a fixed delay between attempts.
pub async fn retry_fixed<T, F, Fut>(mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < RETRY_ATTEMPTS => {
                attempt += 1;
                tracing::debug!(attempt, error = %e, "content fetch failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => return Err(e),
        }
    }
}
