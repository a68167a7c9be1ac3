//! Research orchestration: credentials → crawl → compose → complete → parse.
//!
//! A run is a single sequential task. It either returns a complete
//! [`ResearchResult`] or fails with one [`ResearchError`]; there is no retry
//! and no partial result.

use crate::config::ConfigStore;
use crate::error::{ErrorKind, ResearchError};
use crate::models::{ResearchResult, ResearchRun};
use crate::tasks::{complete, compose, crawl, parse};
use crate::tools::firecrawl::CrawlClient;
use crate::tools::llm::CompletionClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Fixed generation parameters for the completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOptions {
    pub temperature: f64,
    pub max_tokens: u32,
    pub json_mode: bool,
    pub insight_count: usize,
}

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            json_mode: true,
            insight_count: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ValidatingCredentials,
    Crawling,
    Composing,
    Completing,
    Parsing,
    Done,
    Failed(ErrorKind),
}

impl Stage {
    /// Key used in per-run task timings.
    fn task_id(self) -> Option<&'static str> {
        match self {
            Stage::Crawling => Some("crawl"),
            Stage::Composing => Some("compose"),
            Stage::Completing => Some("complete"),
            Stage::Parsing => Some("parse"),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed(_))
    }
}

/// Tracks the current stage of one run and how long each stage took.
#[derive(Debug)]
struct RunState {
    stage: Stage,
    entered_at: Instant,
    task_times: HashMap<String, u64>,
}

impl RunState {
    fn new() -> Self {
        Self {
            stage: Stage::Idle,
            entered_at: Instant::now(),
            task_times: HashMap::new(),
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(!self.stage.is_terminal(), "run already finished");
        if let Some(id) = self.stage.task_id() {
            let elapsed = self.entered_at.elapsed().as_millis() as u64;
            self.task_times.insert(id.to_string(), elapsed);
        }
        debug!("Research stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
        self.entered_at = Instant::now();
    }

    fn fail(&mut self, err: ResearchError) -> ResearchError {
        self.advance(Stage::Failed(err.kind()));
        err
    }
}

pub struct ResearchOrchestrator {
    config: Arc<dyn ConfigStore>,
    crawler: Arc<dyn CrawlClient>,
    completer: Arc<dyn CompletionClient>,
    options: ResearchOptions,
}

impl ResearchOrchestrator {
    pub fn new(
        config: Arc<dyn ConfigStore>,
        crawler: Arc<dyn CrawlClient>,
        completer: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            config,
            crawler,
            completer,
            options: ResearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &Arc<dyn ConfigStore> {
        &self.config
    }

    pub async fn generate_research(&self, topic: &str) -> Result<ResearchResult, ResearchError> {
        self.run(topic).await.map(|run| run.result)
    }

    /// Run the pipeline for `topic`, returning the report with stage timings.
    #[instrument(skip(self))]
    pub async fn run(&self, topic: &str) -> Result<ResearchRun, ResearchError> {
        let mut state = RunState::new();

        state.advance(Stage::ValidatingCredentials);
        let settings = self.config.snapshot();
        let (crawl_key, completion_key) =
            match (&settings.crawl_api_key, &settings.completion_api_key) {
                (Some(crawl_key), Some(completion_key)) => {
                    (crawl_key.clone(), completion_key.clone())
                }
                _ => {
                    return Err(state.fail(ResearchError::MissingCredentials {
                        missing: settings.missing_credentials(),
                    }))
                }
            };

        info!("Starting research for topic: {}", topic);

        state.advance(Stage::Crawling);
        let crawl_data = match crawl::run(self.crawler.as_ref(), &crawl_key, topic).await {
            Ok(data) => data,
            Err(e) => {
                error!("Crawl failed: {}", e);
                return Err(state.fail(e));
            }
        };

        state.advance(Stage::Composing);
        let messages = compose::compose(topic, &crawl_data, self.options.insight_count);
        drop(crawl_data);
        let request = complete::build_request(&settings, &self.options, messages);

        state.advance(Stage::Completing);
        let content =
            match complete::run(self.completer.as_ref(), &completion_key, &request).await {
                Ok(content) => content,
                Err(e) => {
                    error!("Completion failed: {}", e);
                    return Err(state.fail(e));
                }
            };

        state.advance(Stage::Parsing);
        let result = parse::shape(topic, &content).map_err(|e| state.fail(e))?;

        state.advance(Stage::Done);
        info!(
            "Research complete for topic: {} ({} main points)",
            topic,
            result.main_points.len()
        );

        Ok(ResearchRun {
            result,
            task_times: state.task_times,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_state_records_timings_for_work_stages_only() {
        let mut state = RunState::new();
        for stage in [
            Stage::ValidatingCredentials,
            Stage::Crawling,
            Stage::Composing,
            Stage::Completing,
            Stage::Parsing,
            Stage::Done,
        ] {
            state.advance(stage);
        }
        let mut ids: Vec<_> = state.task_times.keys().cloned().collect();
        ids.sort();
        assert_eq!(ids, vec!["complete", "compose", "crawl", "parse"]);
        assert_eq!(state.stage, Stage::Done);
    }

    #[test]
    fn fail_moves_to_terminal_failed_stage() {
        let mut state = RunState::new();
        state.advance(Stage::ValidatingCredentials);
        let err = state.fail(ResearchError::MissingCredentials { missing: vec![] });
        assert_eq!(err.kind(), ErrorKind::MissingCredentials);
        assert_eq!(state.stage, Stage::Failed(ErrorKind::MissingCredentials));
        assert!(state.stage.is_terminal());
    }

    #[test]
    fn default_options_match_report_contract() {
        let options = ResearchOptions::default();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, 2000);
        assert!(options.json_mode);
        assert_eq!(options.insight_count, 10);
    }
}
