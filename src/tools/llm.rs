use crate::error::CompletionError;
use crate::models::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use serde_json::json;
use tracing::{error, instrument};

/// Chat-completion endpoint speaking the OpenAI wire format.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}

#[derive(Debug, Clone, Default)]
pub struct OpenAiClient {
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Request body for `POST {base_url}/chat/completions`.
pub fn request_body(request: &CompletionRequest) -> serde_json::Value {
    let mut body = json!({
        "model": request.model,
        "messages": request.messages,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    });
    if request.json_mode {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

pub fn endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    #[instrument(skip(self, api_key, request), fields(model = %request.model))]
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let response = self
            .http
            .post(endpoint(&request.base_url))
            .bearer_auth(api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("OpenAI API error ({}): {}", status, body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| CompletionError::InvalidBody(e.to_string()))
    }
}
