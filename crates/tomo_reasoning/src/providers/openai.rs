use crate::api_types::{ChatRequest, ChatResponse, CompletionResponse, Message, Role};
use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat completions against any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: Option<&str>, model: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .context("Failed to build HTTP client")?,
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<CompletionResponse> {
        // OpenAI takes the system prompt as the first message
        let mut chat = Vec::with_capacity(messages.len() + 1);
        chat.push(Message {
            role: Role::System,
            content: system.to_string(),
        });
        chat.extend(messages);

        let payload = ChatRequest {
            model: &self.model,
            messages: chat,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let response = with_retry(&self.retry, "OpenAI", || async {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await
                .context("Failed to send request to OpenAI")
        })
        .await?;

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to decode OpenAI response")?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .context("OpenAI response has no choices")?;

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            stop_reason: choice.finish_reason,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_sends_system_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be gentle"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "[]"},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("sk-test", Some(&server.uri()), "gpt-4o-mini").unwrap();
        let resp = client
            .complete("be gentle", vec![Message::user("hello")], CompletionParams::default())
            .await
            .unwrap();
        assert_eq!(resp.text, "[]");
        assert_eq!(resp.stop_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("sk-test", Some(&server.uri()), "gpt-4o-mini").unwrap();
        let err = client
            .complete("s", vec![Message::user("u")], CompletionParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAiClient::new("k", Some("http://localhost:8080/v1/"), "m").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }
}
