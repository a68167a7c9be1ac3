//! Error types for the research pipeline.
//!
//! Every failure ends the current run and reaches the caller as a single
//! [`ResearchError`]. Credentials never appear in error messages.

use crate::config::ConfigKey;

/// Coarse classification of a failed run, used for stage tracking and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredentials,
    CrawlFailure,
    CompletionFailure,
    MalformedResponse,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingCredentials => "missing_credentials",
            ErrorKind::CrawlFailure => "crawl_failure",
            ErrorKind::CompletionFailure => "completion_failure",
            ErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

/// Errors returned by [`ResearchOrchestrator`](crate::pipeline::ResearchOrchestrator).
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    /// One or both API keys are not configured.
    #[error("API keys are required: missing {}", describe_keys(.missing))]
    MissingCredentials { missing: Vec<ConfigKey> },

    /// The crawl service rejected the request or was unreachable.
    #[error("crawl failed: {0}")]
    CrawlFailure(#[from] CrawlError),

    /// The completion service rejected the request or was unreachable.
    #[error("OpenAI API error: {0}")]
    CompletionFailure(#[from] CompletionError),

    /// The model output could not be parsed. `raw` is for diagnostics only.
    #[error("Failed to parse AI response")]
    MalformedResponse { reason: String, raw: String },
}

impl ResearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResearchError::MissingCredentials { .. } => ErrorKind::MissingCredentials,
            ResearchError::CrawlFailure(_) => ErrorKind::CrawlFailure,
            ResearchError::CompletionFailure(_) => ErrorKind::CompletionFailure,
            ResearchError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }
}

fn describe_keys(keys: &[ConfigKey]) -> String {
    keys.iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by a [`CrawlClient`](crate::tools::firecrawl::CrawlClient).
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("crawl service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("crawl job {id} ended with status '{status}'")]
    JobFailed { id: String, status: String },

    #[error("unexpected crawl response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by a [`CompletionClient`](crate::tools::llm::CompletionClient).
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-success status; `body` is the raw upstream error text.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    InvalidBody(String),
}
