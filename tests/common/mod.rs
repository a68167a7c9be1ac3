#![allow(dead_code)]

use async_trait::async_trait;
use research_assistant::models::{
    CompletionChoice, CompletionMessage, CompletionRequest, CompletionResponse, CrawlResult,
};
use research_assistant::{
    CompletionClient, CompletionError, ConfigKey, ConfigStore, CrawlClient, CrawlError,
    MemoryConfigStore, ResearchOrchestrator,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockCrawler {
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
    pub fail: bool,
}

impl MockCrawler {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrawlClient for MockCrawler {
    async fn crawl(&self, _api_key: &str, url: &str) -> Result<CrawlResult, CrawlError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(CrawlError::Status {
                status: 402,
                body: "Payment required".to_string(),
            });
        }
        Ok(CrawlResult(json!({
            "results": [{"url": "https://example.com/ev", "markdown": "EV sales grew"}]
        })))
    }
}

pub enum CompletionReply {
    Content(String),
    Status(u16, String),
    NoChoices,
}

pub struct MockCompleter {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<CompletionRequest>>,
    pub reply: CompletionReply,
}

impl MockCompleter {
    pub fn new(reply: CompletionReply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply,
        })
    }

    pub fn content(content: &str) -> Arc<Self> {
        Self::new(CompletionReply::Content(content.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockCompleter {
    async fn complete(
        &self,
        _api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            CompletionReply::Content(content) => Ok(CompletionResponse {
                choices: vec![CompletionChoice {
                    message: CompletionMessage {
                        content: Some(content.clone()),
                    },
                }],
            }),
            CompletionReply::Status(status, body) => Err(CompletionError::Status {
                status: *status,
                body: body.clone(),
            }),
            CompletionReply::NoChoices => Ok(CompletionResponse::default()),
        }
    }
}

pub fn configured_store() -> Arc<MemoryConfigStore> {
    let store = Arc::new(MemoryConfigStore::new());
    store.set(ConfigKey::CrawlApiKey, "fc-test");
    store.set(ConfigKey::CompletionApiKey, "sk-test");
    store
}

pub fn orchestrator(
    store: Arc<MemoryConfigStore>,
    crawler: Arc<MockCrawler>,
    completer: Arc<MockCompleter>,
) -> ResearchOrchestrator {
    let store: Arc<dyn ConfigStore> = store;
    ResearchOrchestrator::new(store, crawler, completer)
}

pub const EV_REPORT: &str = r#"{"mainPoints":[{"title":"T","content":"C","sources":["https://x"]}],"faq":[],"relatedTopics":["EV batteries"],"links":[]}"#;
