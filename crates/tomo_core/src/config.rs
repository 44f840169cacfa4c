use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomoConfig {
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub session: SessionConfig,
    pub ambient: AmbientConfig,
    pub storage: StorageConfig,
    pub retry: RetrySettings,
    pub gateway: GatewayConfig,
}

impl TomoConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: TomoConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path. A missing or invalid file yields the defaults
    /// with env overrides applied.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("OPENAI_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("TTS_MODEL") {
            self.tts.model = v;
        }
        if let Ok(v) = std::env::var("TTS_VOICE") {
            self.tts.voice = v;
        }
        if let Ok(v) = std::env::var("TOMO_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Ok(v) = std::env::var("TOMO_USER_ID") {
            self.storage.user_id = v;
        }
        if let Ok(v) = std::env::var("TOMO_AMBIENT_DIR") {
            self.ambient.asset_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("TOMO_GATEWAY_HOST") {
            self.gateway.host = v;
        }
        if let Ok(v) = std::env::var("TOMO_GATEWAY_PORT") {
            if let Ok(n) = v.parse() {
                self.gateway.port = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "openai" or "mock". Without an API key the CLI falls back to "mock".
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// How many inspiration lines to request for a prompt.
    pub inspiration_count: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            max_tokens: 2048,
            temperature: 0.7,
            inspiration_count: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub enabled: bool,
    pub model: String,
    pub voice: String,
    pub base_url: Option<String>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini-tts".to_string(),
            voice: "alloy".to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tick_interval_ms: u64,
    /// Used for phases without a duration of their own.
    pub default_phase_duration_secs: u32,
    /// Duration assigned to each freshly generated phase.
    pub generated_phase_duration_secs: u32,
    /// How long the closing message stays up before the session returns.
    pub completion_display_delay_ms: u64,
    pub narration: bool,
}

impl SessionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn completion_display_delay(&self) -> Duration {
        Duration::from_millis(self.completion_display_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            default_phase_duration_secs: crate::model::DEFAULT_PHASE_DURATION_SECS,
            generated_phase_duration_secs: 30,
            completion_display_delay_ms: 2500,
            narration: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub enabled: bool,
    pub asset_dir: PathBuf,
    pub extension: String,
    /// Track used when no asset exists for the target emotion.
    pub fallback: String,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            asset_dir: PathBuf::from("audio"),
            extension: "mp3".to_string(),
            fallback: "calm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// User reference recorded on check-ins and completion records.
    pub user_id: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "tomo.db".to_string(),
            user_id: "local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
