use crate::config::{ConfigKey, ConfigStore};
use crate::error::{ErrorKind, ResearchError};
use crate::models::{ResearchRequest, ResearchResponse, SettingsUpdate, SettingsView};
use crate::pipeline::ResearchOrchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ResearchOrchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config).put(put_config))
        .route("/research", post(research))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn settings_view(store: &dyn ConfigStore) -> SettingsView {
    let settings = store.snapshot();
    SettingsView {
        crawl_api_key_set: settings.crawl_api_key.is_some(),
        completion_api_key_set: settings.completion_api_key.is_some(),
        completion_base_url: settings.completion_base_url,
        completion_model: settings.completion_model,
    }
}

async fn get_config(State(state): State<AppState>) -> Json<SettingsView> {
    Json(settings_view(state.orchestrator.config().as_ref()))
}

#[instrument(skip_all)]
async fn put_config(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Json<SettingsView> {
    let store = state.orchestrator.config().clone();
    let fields = [
        (ConfigKey::CrawlApiKey, update.crawl_api_key),
        (ConfigKey::CompletionApiKey, update.completion_api_key),
        (ConfigKey::CompletionBaseUrl, update.completion_base_url),
        (ConfigKey::CompletionModel, update.completion_model),
    ];
    let writer = store.clone();
    let saved = tokio::task::spawn_blocking(move || {
        for (key, value) in fields {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                writer.set(key, &value);
                info!("{} saved", key.label());
            }
        }
    })
    .await;
    if let Err(e) = saved {
        warn!("Settings update did not finish: {}", e);
    }
    Json(settings_view(store.as_ref()))
}

#[instrument(skip_all, fields(topic = %req.topic))]
async fn research(
    State(state): State<AppState>,
    Json(req): Json<ResearchRequest>,
) -> Result<Json<ResearchResponse>, ApiError> {
    if req.topic.trim().is_empty() {
        return Err(ApiError::EmptyTopic);
    }

    let start_time = std::time::Instant::now();
    let session_id = Uuid::new_v4().to_string();
    info!("Starting research workflow for session {}", session_id);

    let run = state.orchestrator.run(&req.topic).await?;

    info!("Workflow completed in {:?}", start_time.elapsed());
    Ok(Json(ResearchResponse {
        session_id,
        generated_at: chrono::Utc::now(),
        total_time_ms: start_time.elapsed().as_millis() as u64,
        task_times: run.task_times,
        result: run.result,
    }))
}

#[derive(Debug)]
pub enum ApiError {
    EmptyTopic,
    Research(ResearchError),
}

impl From<ResearchError> for ApiError {
    fn from(err: ResearchError) -> Self {
        ApiError::Research(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message, reconfigure) = match self {
            ApiError::EmptyTopic => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "topic must not be empty".to_string(),
                false,
            ),
            ApiError::Research(err) => {
                let kind = err.kind();
                let status = match kind {
                    ErrorKind::MissingCredentials => StatusCode::PRECONDITION_FAILED,
                    ErrorKind::CrawlFailure
                    | ErrorKind::CompletionFailure
                    | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
                };
                (
                    status,
                    kind.as_str(),
                    err.to_string(),
                    kind == ErrorKind::MissingCredentials,
                )
            }
        };
        let body = json!({
            "error": message,
            "kind": kind,
            "reconfigure": reconfigure,
        });
        (status, Json(body)).into_response()
    }
}
