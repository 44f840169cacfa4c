use serde::{Deserialize, Serialize};
use tomo_core::{EmotionDisplay, GenerationRequest};

/// Body of `POST /api/generate`. Every field is optional on the wire so a
/// missing emotion can be reported as a 400 with a readable message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub current_emotion: Option<String>,
    #[serde(default)]
    pub target_emotion: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<GenerateBody> for GenerationRequest {
    fn from(body: GenerateBody) -> Self {
        Self {
            current_emotion: body.current_emotion.unwrap_or_default(),
            target_emotion: body.target_emotion,
            note: body.note,
        }
    }
}

/// Body of `POST /api/tts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtsBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Raw model output when generation produced something unusable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetOption {
    pub id: String,
    pub label: String,
    pub description: String,
    pub emoji: String,
    pub color: String,
}

impl TargetOption {
    pub fn new(id: &str, display: EmotionDisplay) -> Self {
        Self {
            id: id.to_string(),
            label: display.label.into_owned(),
            description: display.description.to_string(),
            emoji: display.emoji.to_string(),
            color: display.color.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetsResponse {
    pub current: String,
    pub targets: Vec<TargetOption>,
}
