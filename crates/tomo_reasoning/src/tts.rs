//! Narration through the OpenAI speech endpoint.

use crate::api_types::SpeechRequest;
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::retry::{with_retry, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tomo_core::config::{RetrySettings, TtsConfig};
use tomo_core::NarrationSynth;

#[derive(Debug, Clone)]
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    retry: RetryConfig,
}

impl OpenAiSpeech {
    pub fn new(api_key: &str, base_url: Option<&str>, model: &str, voice: &str) -> Result<Self> {
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
            voice: voice.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// `Ok(None)` when narration is disabled or there is no API key.
    pub fn from_config(
        config: &TtsConfig,
        retry: &RetrySettings,
        api_key: Option<&str>,
    ) -> Result<Option<Self>> {
        let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            if config.enabled {
                tracing::info!("OPENAI_API_KEY not set, narration disabled");
            }
            return Ok(None);
        };
        if !config.enabled {
            return Ok(None);
        }
        let speech = Self::new(key, config.base_url.as_deref(), &config.model, &config.voice)?
            .with_retry(RetryConfig::from(retry));
        Ok(Some(speech))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl NarrationSynth for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Cannot synthesize empty text");
        }

        let payload = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: "mp3",
        };
        let url = format!("{}/audio/speech", self.base_url);

        let response = with_retry(&self.retry, "OpenAI TTS", || async {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await
                .context("Failed to send speech request")
        })
        .await?;

        let audio = response
            .bytes()
            .await
            .context("Failed to read speech audio")?;
        tracing::debug!("Synthesized {} bytes of narration", audio.len());
        Ok(audio.to_vec())
    }

    fn voice_id(&self) -> &str {
        &self.voice
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
