use crate::error::CrawlError;
use crate::models::{
    CrawlResult, FirecrawlCrawlRequest, FirecrawlCrawlStarted, FirecrawlScrapeOptions,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Job statuses that mean the crawl is still running.
const IN_PROGRESS: &[&str] = &["active", "paused", "pending", "queued", "waiting", "scraping"];

/// Fetches web content for a URL.
#[async_trait]
pub trait CrawlClient: Send + Sync {
    async fn crawl(&self, api_key: &str, url: &str) -> Result<CrawlResult, CrawlError>;
}

/// Crawl client for the Firecrawl v1 API.
///
/// Starts a crawl job and polls it until it completes. The completed status
/// document is returned unmodified.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    page_limit: u32,
}

impl FirecrawlClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(2),
            page_limit: 100,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn start(&self, api_key: &str, url: &str) -> Result<String, CrawlError> {
        let request = FirecrawlCrawlRequest {
            url: url.to_string(),
            limit: self.page_limit,
            scrape_options: FirecrawlScrapeOptions {
                formats: vec!["markdown".to_string(), "html".to_string()],
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/crawl", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CrawlError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        let started: FirecrawlCrawlStarted = response
            .json()
            .await
            .map_err(|e| CrawlError::InvalidResponse(e.to_string()))?;
        Ok(started.id)
    }

    async fn poll(&self, api_key: &str, id: &str) -> Result<serde_json::Value, CrawlError> {
        let status_url = format!("{}/v1/crawl/{}", self.base_url, id);
        loop {
            let response = self
                .http
                .get(&status_url)
                .bearer_auth(api_key)
                .send()
                .await
                .map_err(|e| CrawlError::Transport(e.to_string()))?;

            let document: serde_json::Value = check_status(response)
                .await?
                .json()
                .await
                .map_err(|e| CrawlError::InvalidResponse(e.to_string()))?;

            if document.get("success").and_then(|s| s.as_bool()) == Some(false) {
                let message = document
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("unknown error");
                return Err(CrawlError::InvalidResponse(format!(
                    "crawl job {} reported an error: {}",
                    id, message
                )));
            }

            let Some(status) = document
                .get("status")
                .and_then(|s| s.as_str())
                .map(str::to_string)
            else {
                return Err(CrawlError::InvalidResponse(format!(
                    "crawl job {} status document has no status",
                    id
                )));
            };

            match status.as_str() {
                "completed" => return Ok(document),
                "failed" | "cancelled" => {
                    return Err(CrawlError::JobFailed {
                        id: id.to_string(),
                        status: status.clone(),
                    })
                }
                s if IN_PROGRESS.contains(&s) => {
                    debug!("Crawl job {} is {}, waiting", id, s);
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    return Err(CrawlError::JobFailed {
                        id: id.to_string(),
                        status: other.to_string(),
                    })
                }
            }
        }
    }
}

#[async_trait]
impl CrawlClient for FirecrawlClient {
    #[instrument(skip(self, api_key))]
    async fn crawl(&self, api_key: &str, url: &str) -> Result<CrawlResult, CrawlError> {
        let id = self.start(api_key, url).await?;
        debug!("Started crawl job {}", id);
        let document = self.poll(api_key, &id).await?;
        Ok(CrawlResult(document))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CrawlError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CrawlError::Status {
        status: status.as_u16(),
        body,
    })
}
