//! # Tomo core
//!
//! Shared vocabulary for the meditation journey: the emotion transition model,
//! the phase/session data model, input validation, the error taxonomy and the
//! contracts of every external collaborator.
//!
//! Collaborators are injected as `Arc<dyn Trait>` handles at construction
//! time; nothing in the workspace reaches for a global client.

pub mod audio;
pub mod checkin;
pub mod color;
pub mod config;
pub mod emotion;
pub mod error;
pub mod model;

pub use audio::{AmbientTrack, AudioSink, NullAudioSink};
pub use checkin::{validate_check_in, validate_direction, CheckIn};
pub use color::{journey_color, Hsl};
pub use config::TomoConfig;
pub use emotion::{display_for, targets_for, EmotionDisplay};
pub use error::{ErrorClass, SessionError, ValidationError};
pub use model::{
    GenerationRequest, InspirationLine, MeditationPhase, MeditationScript, MeditationSession,
    MoodEntry, NewSessionRecord, PhaseName, PhaseTheme, SessionStats,
    DEFAULT_PHASE_DURATION_SECS, PHASE_COUNT,
};

use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for check-ins and completion records.
#[async_trait]
pub trait MoodStore: Send + Sync {
    async fn create_entry(
        &self,
        user_id: &str,
        current_emotion: &str,
        note: Option<&str>,
    ) -> anyhow::Result<MoodEntry>;

    async fn get_entry(&self, id: Uuid) -> anyhow::Result<Option<MoodEntry>>;

    async fn set_target_emotion(&self, id: Uuid, target_emotion: &str) -> anyhow::Result<()>;

    async fn record_session(&self, record: NewSessionRecord) -> anyhow::Result<MeditationSession>;

    /// Most recent check-ins first.
    async fn recent_entries(&self, user_id: &str, limit: usize) -> anyhow::Result<Vec<MoodEntry>>;

    async fn session_stats(&self, user_id: &str) -> anyhow::Result<SessionStats>;
}

/// Produces the phase scripts for a journey.
#[async_trait]
pub trait PhaseGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<MeditationPhase>>;
}

/// Speech synthesis for phase narration.
#[async_trait]
pub trait NarrationSynth: Send + Sync {
    /// Synthesize `text`, returning encoded audio (MP3).
    async fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>>;

    fn voice_id(&self) -> &str;

    fn provider_name(&self) -> &'static str;
}

/// Retrieval of source material matching a journey.
#[async_trait]
pub trait InspirationSource: Send + Sync {
    async fn inspirations(
        &self,
        current_emotion: &str,
        target_emotion: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<InspirationLine>>;
}

/// An [`InspirationSource`] that never has anything to offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInspiration;

#[async_trait]
impl InspirationSource for NoInspiration {
    async fn inspirations(
        &self,
        _: &str,
        _: &str,
        _: usize,
    ) -> anyhow::Result<Vec<InspirationLine>> {
        Ok(Vec::new())
    }
}
