//! Mock LLM Provider: deterministic six-phase scripts without an API key.

use crate::api_types::{CompletionResponse, Message};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use serde_json::json;
use tomo_core::PhaseName;

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

/// Value of a `Label: value` line in the prompt.
fn prompt_field<'a>(prompt: &'a str, label: &str) -> Option<&'a str> {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn script(current: &str, target: &str) -> serde_json::Value {
    let texts = [
        format!(
            "Settle into a comfortable position and notice the {current} feeling, \
             without changing it."
        ),
        format!("Feeling {current} is part of being human. Let it be here for a moment."),
        "Breathe in for four counts, hold for four, and breathe out for six.".to_string(),
        format!("This feeling is a wave. Underneath it there is room for something {target}."),
        format!("With each breath, let a little more {target} spread through your body."),
        format!("Whenever you need it today, one slow breath can bring you back to {target}."),
    ];
    PhaseName::ALL
        .iter()
        .zip(texts)
        .map(|(phase, text)| json!({ "phase": phase.as_str(), "text": text }))
        .collect()
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: Vec<Message>,
        _params: CompletionParams,
    ) -> Result<CompletionResponse> {
        let prompt = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let current = prompt_field(prompt, "Current emotion:").unwrap_or("present");
        let target = prompt_field(prompt, "Target emotion:").unwrap_or("calm");
        tracing::debug!("Mock {} generating {} → {}", self.model, current, target);

        Ok(CompletionResponse {
            text: script(current, target).to_string(),
            stop_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
