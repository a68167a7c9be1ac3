//! Schema validation with defaults for model output.
//!
//! The content must be a JSON object. Each known list field is read
//! independently: a missing or non-array field becomes empty, and array
//! elements that do not match the expected shape are dropped.

use crate::error::ResearchError;
use crate::models::{FaqEntry, ResearchLink, ResearchPoint, ResearchResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error};

pub fn shape(topic: &str, content: &str) -> Result<ResearchResult, ResearchError> {
    let object = parse_object(content)?;

    let result = ResearchResult {
        topic: topic.to_string(),
        main_points: list_field::<ResearchPoint>(&object, "mainPoints"),
        faq: list_field::<FaqEntry>(&object, "faq"),
        related_topics: list_field::<String>(&object, "relatedTopics"),
        links: list_field::<ResearchLink>(&object, "links"),
    };
    debug!(
        "Shaped report: {} points, {} faq, {} related, {} links",
        result.main_points.len(),
        result.faq.len(),
        result.related_topics.len(),
        result.links.len()
    );
    Ok(result)
}

fn parse_object(content: &str) -> Result<Map<String, Value>, ResearchError> {
    let malformed = |reason: String| {
        error!("Error parsing AI response: {}; raw content: {}", reason, content);
        ResearchError::MalformedResponse {
            reason,
            raw: content.to_string(),
        }
    };

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(malformed(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

fn list_field<T: DeserializeOwned>(object: &Map<String, Value>, name: &str) -> Vec<T> {
    let Some(Value::Array(items)) = object.get(name) else {
        return Vec::new();
    };
    let parsed: Vec<T> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    if parsed.len() != items.len() {
        debug!(
            "Dropped {} malformed entries from {}",
            items.len() - parsed.len(),
            name
        );
    }
    parsed
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
