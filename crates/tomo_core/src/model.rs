//! Meditation data model.
//!
//! Mood entries and completion records are owned by the store; the core only
//! holds transient copies. A [`MeditationScript`] is the validated, immutable
//! phase sequence a session plays.

use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Number of phases in every meditation.
pub const PHASE_COUNT: usize = 6;

/// Phase duration used when a phase carries no duration of its own.
pub const DEFAULT_PHASE_DURATION_SECS: u32 = 90;

/// The six fixed phases of a meditation, in playback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseName {
    Awareness,
    Acceptance,
    Processing,
    Reframing,
    Integration,
    Maintenance,
}

impl PhaseName {
    pub const ALL: [PhaseName; PHASE_COUNT] = [
        PhaseName::Awareness,
        PhaseName::Acceptance,
        PhaseName::Processing,
        PhaseName::Reframing,
        PhaseName::Integration,
        PhaseName::Maintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Awareness => "Awareness",
            PhaseName::Acceptance => "Acceptance",
            PhaseName::Processing => "Processing",
            PhaseName::Reframing => "Reframing",
            PhaseName::Integration => "Integration",
            PhaseName::Maintenance => "Maintenance",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(label))
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for PhaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation hints attached to a phase. Unknown keys are preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhaseTheme {
    pub fn with_duration(duration: u32) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }
}

/// One narrated segment of a meditation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationPhase {
    pub phase: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<PhaseTheme>,
}

impl MeditationPhase {
    pub fn new(phase: impl Into<String>, text: impl Into<String>, duration: Option<u32>) -> Self {
        Self {
            phase: phase.into(),
            text: text.into(),
            theme: duration.map(PhaseTheme::with_duration),
        }
    }

    /// Configured duration in seconds, or [`DEFAULT_PHASE_DURATION_SECS`]
    /// when unset or zero.
    pub fn duration_secs(&self) -> u32 {
        self.theme
            .as_ref()
            .and_then(|t| t.duration)
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_PHASE_DURATION_SECS)
    }
}

/// A validated sequence of exactly [`PHASE_COUNT`] phases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MeditationScript(Vec<MeditationPhase>);

impl MeditationScript {
    pub fn new(phases: Vec<MeditationPhase>) -> Result<Self, SessionError> {
        if phases.len() != PHASE_COUNT {
            return Err(SessionError::MalformedScript(format!(
                "expected {} phases, got {}",
                PHASE_COUNT,
                phases.len()
            )));
        }
        if let Some(i) = phases.iter().position(|p| p.text.trim().is_empty()) {
            return Err(SessionError::MalformedScript(format!(
                "phase {} has no text",
                i + 1
            )));
        }
        Ok(Self(phases))
    }

    pub fn phases(&self) -> &[MeditationPhase] {
        &self.0
    }

    pub fn phase(&self, index: usize) -> Option<&MeditationPhase> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Saturates at `u32::MAX`.
    pub fn total_duration_secs(&self) -> u32 {
        self.duration_before(self.0.len())
    }

    /// Sum of the durations of all phases before `index`, saturating at
    /// `u32::MAX`.
    pub fn duration_before(&self, index: usize) -> u32 {
        self.0
            .iter()
            .take(index)
            .map(MeditationPhase::duration_secs)
            .fold(0u32, u32::saturating_add)
    }
}

/// A check-in: the emotion a user reported and the direction they chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: String,
    pub current_emotion: String,
    pub target_emotion: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a completion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSessionRecord {
    pub user_id: String,
    pub mood_entry_id: Uuid,
    pub completed: bool,
    pub duration_seconds: u32,
}

/// A stored completion record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationSession {
    pub id: Uuid,
    pub user_id: String,
    pub mood_entry_id: Uuid,
    pub completed: bool,
    pub duration_seconds: u32,
    pub created_at: DateTime<Utc>,
}

/// Aggregate practice numbers for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub sessions: u64,
    pub completed: u64,
    pub total_seconds: u64,
}

impl SessionStats {
    pub fn total_minutes(&self) -> u64 {
        self.total_seconds.saturating_add(30) / 60
    }
}

/// Input to the phase generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub current_emotion: String,
    #[serde(default)]
    pub target_emotion: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<&MoodEntry> for GenerationRequest {
    fn from(entry: &MoodEntry) -> Self {
        Self {
            current_emotion: entry.current_emotion.clone(),
            target_emotion: entry.target_emotion.clone(),
            note: entry.note.clone(),
        }
    }
}

/// A retrieved line of source material for a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspirationLine {
    pub current_emotion: String,
    pub target_emotion: String,
    pub text: String,
}
