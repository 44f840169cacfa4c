use thiserror::Error;

/// Why a phase script could not be produced.
///
/// Everything except [`GenerationError::Upstream`] means the model answered
/// with something unusable; `raw` keeps that answer for diagnostics.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("currentEmotion and targetEmotion are required")]
    MissingEmotion,

    #[error("AI did not return 6 phases")]
    WrongPhaseCount { count: usize, raw: String },

    #[error("AI did not return 6 phases")]
    Unparsable { raw: String },

    #[error("AI returned phase {} without text", .index + 1)]
    MissingText { index: usize, raw: String },

    #[error("generation service failed: {0:#}")]
    Upstream(anyhow::Error),
}

impl GenerationError {
    /// The model output behind a malformed script, if any.
    pub fn raw(&self) -> Option<&str> {
        match self {
            GenerationError::WrongPhaseCount { raw, .. }
            | GenerationError::Unparsable { raw }
            | GenerationError::MissingText { raw, .. } => Some(raw),
            GenerationError::MissingEmotion | GenerationError::Upstream(_) => None,
        }
    }

    pub fn is_malformed_output(&self) -> bool {
        self.raw().is_some()
    }
}
