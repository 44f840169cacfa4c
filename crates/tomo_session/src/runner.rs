//! Session runner: owns the clock, the audio and the completion record.
//!
//! One spawned task per session. It is the only writer of the [`Playback`]:
//! ticks from its single interval and user commands from the handle are
//! serialised through the same `select!` loop, so the state machine never sees
//! two writers.

use crate::ambient::AmbientLibrary;
use crate::heartbeat::TickConfig;
use crate::narration::{NarrationController, NarrationReady};
use crate::playback::{Command, Playback, PlaybackSnapshot, Transition};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tomo_core::config::SessionConfig;
use tomo_core::{
    AudioSink, MeditationPhase, MeditationSession, MoodStore, NarrationSynth, NewSessionRecord,
    SessionError, DEFAULT_PHASE_DURATION_SECS,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    /// The command channel closed before the session ended. Nothing is recorded.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub status: OutcomeStatus,
    pub elapsed_seconds: u32,
    /// The stored completion record; `None` if abandoned or the write failed.
    pub record: Option<MeditationSession>,
}

/// Builds and launches sessions with injected collaborators.
pub struct SessionRunner {
    store: Arc<dyn MoodStore>,
    sink: Arc<dyn AudioSink>,
    synth: Option<Arc<dyn NarrationSynth>>,
    ambient: Option<AmbientLibrary>,
    user_id: String,
    tick: TickConfig,
    default_phase_duration_secs: u32,
    completion_delay: Duration,
}

impl SessionRunner {
    pub fn new(
        store: Arc<dyn MoodStore>,
        sink: Arc<dyn AudioSink>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sink,
            synth: None,
            ambient: None,
            user_id: user_id.into(),
            tick: TickConfig::default(),
            default_phase_duration_secs: DEFAULT_PHASE_DURATION_SECS,
            completion_delay: Duration::from_millis(2500),
        }
    }

    pub fn with_narration(mut self, synth: Option<Arc<dyn NarrationSynth>>) -> Self {
        self.synth = synth;
        self
    }

    pub fn with_ambient(mut self, ambient: Option<AmbientLibrary>) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_tick(mut self, tick: TickConfig) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Apply the session section of the config file.
    pub fn with_session_config(mut self, config: &SessionConfig) -> Self {
        self.tick = TickConfig::from_interval(config.tick_interval());
        self.default_phase_duration_secs = config.default_phase_duration_secs;
        self.completion_delay = config.completion_display_delay();
        if !config.narration {
            self.synth = None;
        }
        self
    }

    /// The Loading step: fetch the entry and validate it together with the
    /// phases. Every error here is fatal to the session.
    pub async fn load(
        &self,
        entry_id: Option<Uuid>,
        phases: Vec<MeditationPhase>,
    ) -> Result<Playback, SessionError> {
        let id = entry_id.ok_or(SessionError::MissingEntryId)?;
        let entry = self
            .store
            .get_entry(id)
            .await
            .map_err(|e| SessionError::Store(format!("{:#}", e)))?
            .ok_or(SessionError::EntryNotFound(id))?;
        let playback = Playback::open(&entry, phases, self.default_phase_duration_secs)?;
        tracing::info!(
            "Session loaded for entry {}: {} → {}, {}s",
            id,
            playback.current_emotion(),
            playback.target_emotion(),
            playback.script().total_duration_secs()
        );
        Ok(playback)
    }

    /// Start the session task. The playback begins paused.
    pub fn spawn(&self, playback: Playback) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(playback.snapshot());
        let (ready_tx, ready_rx) = mpsc::channel(4);

        let task = SessionTask {
            playback,
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            narration: NarrationController::new(self.synth.clone(), ready_tx),
            narrated_phase: None,
            user_id: self.user_id.clone(),
            snapshot_tx,
            completion_delay: self.completion_delay,
        };

        if let Some(track) = self
            .ambient
            .as_ref()
            .and_then(|lib| lib.resolve(task.playback.target_emotion()))
        {
            log_audio("start ambient track", self.sink.start_ambient(&track));
        }

        let period = self.tick.interval;
        let task = tokio::spawn(task.run(command_rx, ready_rx, period));

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            task,
        }
    }
}

/// Control surface of a running session.
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Returns false once the session no longer accepts commands.
    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }

    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to end on its own (timer or an `End` command).
    pub async fn join(self) -> anyhow::Result<SessionOutcome> {
        let Self { commands, task, .. } = self;
        let outcome = task.await?;
        drop(commands);
        Ok(outcome)
    }

    /// Leave the session: no completion record is written.
    pub async fn abandon(self) -> anyhow::Result<SessionOutcome> {
        let Self { commands, task, .. } = self;
        drop(commands);
        Ok(task.await?)
    }
}

struct SessionTask {
    playback: Playback,
    store: Arc<dyn MoodStore>,
    sink: Arc<dyn AudioSink>,
    narration: NarrationController,
    /// Phase whose narration has been requested.
    narrated_phase: Option<usize>,
    user_id: String,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    completion_delay: Duration,
}

impl SessionTask {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut ready: mpsc::Receiver<NarrationReady>,
        period: Duration,
    ) -> SessionOutcome {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let transition = tokio::select! {
                _ = interval.tick(), if self.playback.is_playing() => {
                    self.playback.apply(Command::Tick)
                }
                command = commands.recv() => match command {
                    Some(command) => self.playback.apply(command),
                    None => return self.abandon(),
                },
                Some(result) = ready.recv() => {
                    self.on_narration(result);
                    continue;
                }
            };

            match transition {
                Transition::Idle => continue,
                Transition::Resumed => {
                    interval.reset();
                    log_audio("resume audio", self.sink.set_playing(true));
                    if self.narrated_phase != Some(self.playback.phase_index()) {
                        self.start_narration();
                    }
                }
                Transition::Paused => {
                    log_audio("pause audio", self.sink.set_playing(false));
                }
                Transition::Ticked => {}
                Transition::PhaseAdvanced { from, to } => {
                    tracing::debug!("Phase {} → {}", from, to);
                    log_audio("stop narration", self.sink.stop_narration());
                    if self.playback.is_playing() {
                        self.start_narration();
                    } else {
                        self.narration.cancel();
                        self.narrated_phase = None;
                    }
                }
                Transition::Completing { elapsed_seconds } => {
                    return self.complete(elapsed_seconds).await;
                }
                Transition::Completed => {}
            }
            self.publish();
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.playback.snapshot());
    }

    fn start_narration(&mut self) {
        let index = self.playback.phase_index();
        let text = self.playback.current_phase().text.clone();
        self.narration.start(index, &text);
        self.narrated_phase = Some(index);
    }

    fn on_narration(&mut self, result: NarrationReady) {
        if !self.narration.is_current(result.generation)
            || result.phase_index != self.playback.phase_index()
            || self.playback.is_finished()
        {
            tracing::debug!(
                "Discarding stale narration for phase {} (generation {})",
                result.phase_index,
                result.generation
            );
            return;
        }
        log_audio(
            "play narration",
            self.sink.play_narration(result.phase_index, result.audio),
        );
    }

    fn release_audio(&mut self) {
        self.narration.cancel();
        log_audio("stop audio", self.sink.stop_all());
    }

    async fn complete(mut self, elapsed_seconds: u32) -> SessionOutcome {
        self.release_audio();

        let record = NewSessionRecord {
            user_id: self.user_id.clone(),
            mood_entry_id: self.playback.entry_id(),
            completed: true,
            duration_seconds: elapsed_seconds,
        };
        let record = match self.store.record_session(record).await {
            Ok(saved) => {
                tracing::info!(
                    "Session {} recorded: {}s for entry {}",
                    saved.id,
                    elapsed_seconds,
                    saved.mood_entry_id
                );
                Some(saved)
            }
            Err(e) => {
                tracing::warn!("Failed to record completed session: {:#}", e);
                None
            }
        };
        self.publish();

        tokio::time::sleep(self.completion_delay).await;
        self.playback.apply(Command::Finish);
        self.publish();

        SessionOutcome {
            status: OutcomeStatus::Completed,
            elapsed_seconds,
            record,
        }
    }

    fn abandon(mut self) -> SessionOutcome {
        tracing::info!(
            "Session for entry {} abandoned at {}s",
            self.playback.entry_id(),
            self.playback.elapsed_seconds()
        );
        self.release_audio();
        SessionOutcome {
            status: OutcomeStatus::Abandoned,
            elapsed_seconds: self.playback.elapsed_seconds(),
            record: None,
        }
    }
}

fn log_audio(action: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Audio: failed to {}: {:#}", action, e);
    }
}
