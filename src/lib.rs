//! Topic research pipeline: crawl the web for a topic, ask a chat-completion
//! model for a structured report, and return it as a [`ResearchResult`].

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod tools;

pub use config::{ConfigKey, ConfigStore, FileConfigStore, MemoryConfigStore, Settings};
pub use error::{CompletionError, CrawlError, ErrorKind, ResearchError};
pub use models::{FaqEntry, ResearchLink, ResearchPoint, ResearchResult, ResearchRun};
pub use pipeline::{ResearchOptions, ResearchOrchestrator, Stage};
pub use tools::firecrawl::{CrawlClient, FirecrawlClient};
pub use tools::llm::{CompletionClient, OpenAiClient};
