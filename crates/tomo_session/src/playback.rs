//! The playback state machine.
//!
//! `Playback` is the single authoritative record of where a session is. It is
//! created by [`Playback::open`] (the Loading step) and mutated only through
//! [`Playback::apply`], so a timer tick, a skip and an end request can never
//! interleave half-way: each command moves the record atomically and reports
//! exactly one [`Transition`].
//!
//! ```text
//! open() ──► Paused ◄──► Playing ──► Completing ──► Completed
//!              │  skip/tick advance phase 0..5  ▲
//!              └──────────── end / last phase ──┘
//! ```

use serde::Serialize;
use tomo_core::{journey_color, Hsl, MeditationPhase, MeditationScript, MoodEntry, SessionError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Playing,
    Paused,
    /// Timers and audio are stopped and the completion record is being written.
    Completing,
    /// Terminal.
    Completed,
}

/// Inputs to the state machine: user actions plus the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    /// One second of meditation time has passed.
    Tick,
    Skip,
    End,
    /// The closing message has been shown long enough.
    Finish,
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The command had no effect in the current state.
    Idle,
    Resumed,
    Paused,
    Ticked,
    PhaseAdvanced { from: usize, to: usize },
    /// Reported once per playback; carries the seconds to record.
    Completing { elapsed_seconds: u32 },
    Completed,
}

/// Render-ready view of a playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub phase_index: usize,
    pub phase_count: usize,
    pub phase_name: String,
    pub text: String,
    pub elapsed_in_phase: u32,
    pub phase_duration: u32,
    pub phase_progress: f32,
    pub total_progress: f32,
    pub journey_progress: f32,
    pub background: Hsl,
    pub elapsed_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct Playback {
    entry_id: Uuid,
    current_emotion: String,
    target_emotion: String,
    script: MeditationScript,
    status: PlaybackStatus,
    phase_index: usize,
    elapsed_in_phase: u32,
}

impl Playback {
    /// Validate the entry and phases and produce a paused playback.
    ///
    /// Phases without a duration get `default_phase_duration_secs`.
    pub fn open(
        entry: &MoodEntry,
        phases: Vec<MeditationPhase>,
        default_phase_duration_secs: u32,
    ) -> Result<Self, SessionError> {
        let target_emotion = entry
            .target_emotion
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingTargetEmotion)?
            .to_string();

        let phases = phases
            .into_iter()
            .map(|mut p| {
                let theme = p.theme.get_or_insert_with(Default::default);
                if theme.duration.unwrap_or(0) == 0 {
                    theme.duration = Some(default_phase_duration_secs.max(1));
                }
                p
            })
            .collect();
        let script = MeditationScript::new(phases)?;

        Ok(Self {
            entry_id: entry.id,
            current_emotion: entry.current_emotion.clone(),
            target_emotion,
            script,
            status: PlaybackStatus::Paused,
            phase_index: 0,
            elapsed_in_phase: 0,
        })
    }

    /// The only mutation entry point.
    pub fn apply(&mut self, command: Command) -> Transition {
        use Command as C;
        use PlaybackStatus as S;

        match (self.status, command) {
            (S::Completing, C::Finish) => {
                self.status = S::Completed;
                Transition::Completed
            }
            (S::Completing | S::Completed, _) | (_, C::Finish) => Transition::Idle,
            (S::Paused, C::Play | C::Toggle) => {
                self.status = S::Playing;
                Transition::Resumed
            }
            (S::Playing, C::Pause | C::Toggle) => {
                self.status = S::Paused;
                Transition::Paused
            }
            (S::Playing, C::Play) | (S::Paused, C::Pause | C::Tick) => Transition::Idle,
            (S::Playing, C::Tick) => self.tick(),
            (_, C::Skip) => self.advance(),
            (_, C::End) => self.begin_completion(),
        }
    }

    fn tick(&mut self) -> Transition {
        self.elapsed_in_phase += 1;
        if self.elapsed_in_phase >= self.phase_duration() {
            self.advance()
        } else {
            Transition::Ticked
        }
    }

    /// Shared by timer expiry and skip.
    fn advance(&mut self) -> Transition {
        if self.is_last_phase() {
            return self.begin_completion();
        }
        let from = self.phase_index;
        self.phase_index += 1;
        self.elapsed_in_phase = 0;
        Transition::PhaseAdvanced {
            from,
            to: self.phase_index,
        }
    }

    fn begin_completion(&mut self) -> Transition {
        self.status = PlaybackStatus::Completing;
        Transition::Completing {
            elapsed_seconds: self.elapsed_seconds(),
        }
    }

    fn is_last_phase(&self) -> bool {
        self.phase_index + 1 >= self.script.len()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// True once the session is Completing or Completed.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            PlaybackStatus::Completing | PlaybackStatus::Completed
        )
    }

    pub fn entry_id(&self) -> Uuid {
        self.entry_id
    }

    pub fn current_emotion(&self) -> &str {
        &self.current_emotion
    }

    pub fn target_emotion(&self) -> &str {
        &self.target_emotion
    }

    pub fn script(&self) -> &MeditationScript {
        &self.script
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn current_phase(&self) -> &MeditationPhase {
        &self.script.phases()[self.phase_index]
    }

    pub fn phase_duration(&self) -> u32 {
        self.current_phase().duration_secs()
    }

    pub fn elapsed_in_phase(&self) -> u32 {
        self.elapsed_in_phase
    }

    /// Durations of the phases before the active one plus time spent in it,
    /// never more than the whole script.
    pub fn elapsed_seconds(&self) -> u32 {
        let active = self.elapsed_in_phase.min(self.phase_duration());
        self.script
            .duration_before(self.phase_index)
            .saturating_add(active)
            .min(self.script.total_duration_secs())
    }

    /// Position in the journey for colour interpolation: 0.0 on the first
    /// phase, 1.0 on the last.
    pub fn journey_progress(&self) -> f32 {
        let span = self.script.len().saturating_sub(1).max(1);
        self.phase_index as f32 / span as f32
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let phase = self.current_phase();
        let phase_duration = phase.duration_secs();
        let phase_progress = (self.elapsed_in_phase as f32 / phase_duration as f32).min(1.0);
        let total_progress =
            (self.phase_index as f32 + phase_progress) / self.script.len() as f32;
        let journey_progress = self.journey_progress();
        PlaybackSnapshot {
            status: self.status,
            phase_index: self.phase_index,
            phase_count: self.script.len(),
            phase_name: phase.phase.clone(),
            text: phase.text.clone(),
            elapsed_in_phase: self.elapsed_in_phase,
            phase_duration,
            phase_progress,
            total_progress,
            journey_progress,
            background: journey_color(
                &self.current_emotion,
                &self.target_emotion,
                journey_progress,
            ),
            elapsed_seconds: self.elapsed_seconds(),
        }
    }
}
