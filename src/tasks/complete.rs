use crate::config::Settings;
use crate::error::ResearchError;
use crate::models::{ChatMessage, CompletionRequest};
use crate::pipeline::ResearchOptions;
use crate::tools::llm::CompletionClient;
use tracing::{error, info, instrument};

pub fn build_request(
    settings: &Settings,
    options: &ResearchOptions,
    messages: Vec<ChatMessage>,
) -> CompletionRequest {
    CompletionRequest {
        base_url: settings.completion_base_url.clone(),
        model: settings.completion_model.clone(),
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        json_mode: options.json_mode,
    }
}

/// Call the completion endpoint and return the first choice's message content.
#[instrument(skip_all, fields(model = %request.model))]
pub async fn run(
    client: &dyn CompletionClient,
    api_key: &str,
    request: &CompletionRequest,
) -> Result<String, ResearchError> {
    info!("Using OpenAI API URL: {}", request.base_url);
    let response = client.complete(api_key, request).await?;
    info!("AI analysis completed with {} choices", response.choices.len());

    match response.first_content() {
        Some(content) => Ok(content.to_string()),
        None => {
            let raw = serde_json::to_string(&response).unwrap_or_default();
            error!("AI response has no message content; raw response: {}", raw);
            Err(ResearchError::MalformedResponse {
                reason: "response has no message content".to_string(),
                raw,
            })
        }
    }
}
