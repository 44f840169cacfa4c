pub mod mock;
pub mod openai;

use crate::llm::LlmClient;
use crate::retry::RetryConfig;
use anyhow::Result;
use std::sync::Arc;
use tomo_core::config::{LlmConfig, RetrySettings};

/// Build the configured LLM client. Without an API key every provider
/// degrades to the mock so the app stays usable offline.
pub fn create_client(
    config: &LlmConfig,
    retry: &RetrySettings,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>> {
    let api_key = api_key.map(str::trim).filter(|k| !k.is_empty());
    match (config.provider.as_str(), api_key) {
        ("mock", _) => Ok(Arc::new(mock::MockProvider::new(&config.model))),
        ("openai", Some(key)) => {
            let client = openai::OpenAiClient::new(key, config.base_url.as_deref(), &config.model)?
                .with_retry(RetryConfig::from(retry));
            Ok(Arc::new(client))
        }
        ("openai", None) => {
            tracing::warn!("OPENAI_API_KEY not set, using the mock provider");
            Ok(Arc::new(mock::MockProvider::new(&config.model)))
        }
        (other, _) => anyhow::bail!("Unknown LLM provider '{}' (expected openai or mock)", other),
    }
}
