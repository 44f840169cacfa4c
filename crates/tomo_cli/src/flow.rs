//! The interactive journey: check in, choose a direction, meditate.

use crate::render::{mood_menu, outcome_summary, phase_banner, progress_line, targets_menu};
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, Lines};
use tomo_core::emotion::check_in_moods;
use tomo_core::{
    targets_for, validate_check_in, validate_direction, CheckIn, GenerationRequest, MoodStore,
    PhaseGenerator,
};
use tomo_session::{Command, PlaybackSnapshot, PlaybackStatus, SessionOutcome, SessionRunner};

const HELP: &str = "p = play/pause, s = skip phase, e = end now, q = leave without saving";

/// How a journey ended.
#[derive(Debug)]
pub enum JourneyEnd {
    Finished(SessionOutcome),
    /// A fatal error; the user is sent back to check-in.
    StartOver(String),
    /// Input closed before the session started.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineCommand {
    Session(Command),
    Leave,
}

fn parse_command(line: &str) -> Option<LineCommand> {
    match line.trim().to_lowercase().as_str() {
        "p" | "play" | "pause" => Some(LineCommand::Session(Command::Toggle)),
        "s" | "skip" => Some(LineCommand::Session(Command::Skip)),
        "e" | "end" => Some(LineCommand::Session(Command::End)),
        "q" | "quit" | "exit" => Some(LineCommand::Leave),
        _ => None,
    }
}

/// A menu answer: a 1-based number picks from `options`, anything else is taken as typed.
fn pick<'a>(answer: &'a str, options: &[&'a str]) -> &'a str {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i).copied())
        .unwrap_or(answer)
}

async fn ask<R, W>(lines: &mut Lines<R>, out: &mut W, prompt: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}\n> ", prompt)?;
    out.flush()?;
    Ok(lines.next_line().await?)
}

pub struct Journey {
    store: Arc<dyn MoodStore>,
    generator: Arc<dyn PhaseGenerator>,
    runner: SessionRunner,
    user_id: String,
}

impl Journey {
    pub fn new(
        store: Arc<dyn MoodStore>,
        generator: Arc<dyn PhaseGenerator>,
        runner: SessionRunner,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            generator,
            runner,
            user_id: user_id.into(),
        }
    }

    pub async fn run<R, W>(&self, lines: &mut Lines<R>, out: &mut W) -> Result<JourneyEnd>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let Some(check_in) = self.check_in(lines, out).await? else {
            return Ok(JourneyEnd::Cancelled);
        };
        let entry = self
            .store
            .create_entry(&self.user_id, &check_in.current_emotion, check_in.note.as_deref())
            .await?;

        let Some(target) = self.direction(lines, out, &check_in.current_emotion).await? else {
            return Ok(JourneyEnd::Cancelled);
        };
        self.store.set_target_emotion(entry.id, &target).await?;

        writeln!(out, "Preparing your meditation toward {}...", target)?;
        let request = GenerationRequest {
            current_emotion: check_in.current_emotion.clone(),
            target_emotion: Some(target),
            note: check_in.note,
        };
        let phases = match self.generator.generate(&request).await {
            Ok(phases) => phases,
            Err(e) => {
                tracing::warn!("Generation failed for entry {}: {:#}", entry.id, e);
                writeln!(out, "Could not prepare your meditation: {}", e)?;
                return Ok(JourneyEnd::StartOver(e.to_string()));
            }
        };

        let playback = match self.runner.load(Some(entry.id), phases).await {
            Ok(playback) => playback,
            Err(e) => {
                tracing::warn!("Session failed to load: {}", e);
                writeln!(out, "{}", e.restart_hint())?;
                return Ok(JourneyEnd::StartOver(e.to_string()));
            }
        };

        writeln!(out, "Ready. {}", HELP)?;
        self.play(lines, out, playback).await
    }

    async fn check_in<R, W>(&self, lines: &mut Lines<R>, out: &mut W) -> Result<Option<CheckIn>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let moods: Vec<&str> = check_in_moods().iter().map(|m| m.id).collect();
        loop {
            let Some(answer) = ask(lines, out, &mood_menu()).await? else {
                return Ok(None);
            };
            let mood = pick(&answer, &moods);
            // The note only gets asked once the mood is usable.
            if let Err(e) = validate_check_in(mood, None) {
                writeln!(out, "{}", e)?;
                continue;
            }
            let Some(note) = ask(lines, out, "Anything you want to add? (optional)").await? else {
                return Ok(None);
            };
            return Ok(Some(validate_check_in(mood, Some(&note))?));
        }
    }

    async fn direction<R, W>(
        &self,
        lines: &mut Lines<R>,
        out: &mut W,
        current: &str,
    ) -> Result<Option<String>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let targets = targets_for(Some(current));
        loop {
            let Some(answer) = ask(lines, out, &targets_menu(current)).await? else {
                return Ok(None);
            };
            match validate_direction(current, Some(pick(&answer, targets))) {
                Ok(target) => return Ok(Some(target)),
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
    }

    async fn play<R, W>(
        &self,
        lines: &mut Lines<R>,
        out: &mut W,
        playback: tomo_session::Playback,
    ) -> Result<JourneyEnd>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let handle = self.runner.spawn(playback);
        let mut snapshots = handle.subscribe();
        let mut shown_phase = None;
        render(out, &snapshots.borrow_and_update().clone(), &mut shown_phase)?;

        let mut input_open = true;
        // Tracks the toggles sent so far; the session starts paused.
        let mut playing = false;
        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snap = snapshots.borrow_and_update().clone();
                    render(out, &snap, &mut shown_phase)?;
                    if snap.status == PlaybackStatus::Completed {
                        break;
                    }
                }
                line = lines.next_line(), if input_open => {
                    let leave = match line? {
                        // Nobody can press play any more.
                        None if !playing => true,
                        None => {
                            input_open = false;
                            false
                        }
                        Some(line) => match parse_command(&line) {
                            Some(LineCommand::Leave) => true,
                            Some(LineCommand::Session(command)) => {
                                if command == Command::Toggle {
                                    playing = !playing;
                                }
                                if !handle.send(command).await {
                                    break;
                                }
                                false
                            }
                            None => {
                                if !line.trim().is_empty() {
                                    writeln!(out, "\n{}", HELP)?;
                                }
                                false
                            }
                        },
                    };
                    if leave {
                        let outcome = handle.abandon().await?;
                        writeln!(out, "\n{}", outcome_summary(&outcome))?;
                        return Ok(JourneyEnd::Finished(outcome));
                    }
                }
            }
        }

        let outcome = handle.join().await?;
        writeln!(out, "\n{}", outcome_summary(&outcome))?;
        Ok(JourneyEnd::Finished(outcome))
    }
}

fn render<W: Write>(
    out: &mut W,
    snap: &PlaybackSnapshot,
    shown_phase: &mut Option<usize>,
) -> Result<()> {
    match snap.status {
        PlaybackStatus::Completing => {
            writeln!(out, "\n\nWell done. Take a breath before you return.")?;
        }
        PlaybackStatus::Completed => {}
        PlaybackStatus::Playing | PlaybackStatus::Paused => {
            if *shown_phase != Some(snap.phase_index) {
                *shown_phase = Some(snap.phase_index);
                write!(out, "\n{}", phase_banner(snap))?;
            }
            write!(out, "\r{}", progress_line(snap))?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::io::AsyncBufReadExt;
    use tomo_core::{MeditationPhase, NullAudioSink};
    use tomo_reasoning::providers::mock::MockProvider;
    use tomo_reasoning::ScriptGenerator;
    use tomo_session::{OutcomeStatus, TickConfig};
    use tomo_store::SqliteStore;

    struct Unavailable;

    #[async_trait]
    impl PhaseGenerator for Unavailable {
        async fn generate(&self, _: &GenerationRequest) -> anyhow::Result<Vec<MeditationPhase>> {
            anyhow::bail!("generation service failed: upstream 503")
        }
    }

    async fn journey(generator: Arc<dyn PhaseGenerator>) -> (Journey, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::new(":memory:").await.unwrap());
        let runner = SessionRunner::new(store.clone(), Arc::new(NullAudioSink), "local")
            .with_tick(TickConfig::from_interval(Duration::from_millis(1)))
            .with_completion_delay(Duration::ZERO);
        (Journey::new(store.clone(), generator, runner, "local"), store)
    }

    fn mock_generator() -> Arc<dyn PhaseGenerator> {
        Arc::new(ScriptGenerator::new(Arc::new(MockProvider::new("mock"))).with_phase_duration(1))
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(" P "), Some(LineCommand::Session(Command::Toggle)));
        assert_eq!(parse_command("skip"), Some(LineCommand::Session(Command::Skip)));
        assert_eq!(parse_command("e"), Some(LineCommand::Session(Command::End)));
        assert_eq!(parse_command("q"), Some(LineCommand::Leave));
        assert_eq!(parse_command("dance"), None);
    }

    #[test]
    fn test_pick() {
        let options = ["calm", "grounded", "peaceful"];
        assert_eq!(pick("2", &options), "grounded");
        assert_eq!(pick("4", &options), "4");
        assert_eq!(pick("0", &options), "0");
        assert_eq!(pick("Calm", &options), "Calm");
    }

    #[tokio::test]
    async fn test_full_journey_records_session() {
        let (journey, store) = journey(mock_generator()).await;
        let mut lines = "3\nbig exam\n1\np\n".as_bytes().lines();
        let mut out = Vec::new();

        let end = journey.run(&mut lines, &mut out).await.unwrap();
        let outcome = match end {
            JourneyEnd::Finished(outcome) => outcome,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(outcome.status, OutcomeStatus::Completed);
        assert_eq!(outcome.elapsed_seconds, 6);
        assert!(outcome.record.is_some());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[1/6] Awareness"));
        assert!(text.contains("[6/6] Maintenance"));
        assert!(text.contains("Meditation complete."));

        let entries = store.recent_entries("local", 7).await.unwrap();
        assert_eq!(entries[0].current_emotion, "anxious");
        assert_eq!(entries[0].target_emotion.as_deref(), Some("calm"));
        assert_eq!(entries[0].note.as_deref(), Some("big exam"));
        assert_eq!(store.session_stats("local").await.unwrap().completed, 1);
    }

    #[tokio::test]
    async fn test_invalid_answers_are_asked_again() {
        let (journey, store) = journey(mock_generator()).await;
        let mut lines = "   \nsad\n\n9\njoyful\n2\nq\n".as_bytes().lines();
        let mut out = Vec::new();

        let end = journey.run(&mut lines, &mut out).await.unwrap();
        let outcome = match end {
            JourneyEnd::Finished(outcome) => outcome,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(outcome.status, OutcomeStatus::Abandoned);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("please choose how you are feeling"));
        assert!(text.contains("'9' is not one of the directions offered from 'sad'"));
        assert!(text.contains("'joyful' is not one of the directions"));
        assert!(text.contains("Nothing was recorded"));

        let entries = store.recent_entries("local", 7).await.unwrap();
        assert_eq!(entries[0].target_emotion.as_deref(), Some("content"));
        assert_eq!(entries[0].note, None);
        assert_eq!(store.session_stats("local").await.unwrap().sessions, 0);
    }

    #[tokio::test]
    async fn test_generation_failure_starts_over() {
        let (journey, store) = journey(Arc::new(Unavailable)).await;
        let mut lines = "happy\n\njoyful\n".as_bytes().lines();
        let mut out = Vec::new();

        let end = journey.run(&mut lines, &mut out).await.unwrap();
        assert!(matches!(end, JourneyEnd::StartOver(ref reason) if reason.contains("503")));
        assert_eq!(store.session_stats("local").await.unwrap().sessions, 0);
    }

    #[tokio::test]
    async fn test_closed_input() {
        let (journey, _store) = journey(mock_generator()).await;
        let mut lines = "".as_bytes().lines();
        let mut out = Vec::new();
        assert!(matches!(
            journey.run(&mut lines, &mut out).await.unwrap(),
            JourneyEnd::Cancelled
        ));

        // Closing input while paused leaves the session.
        let mut lines = "calm\n\n1\n".as_bytes().lines();
        let end = journey.run(&mut lines, &mut out).await.unwrap();
        assert!(matches!(
            end,
            JourneyEnd::Finished(SessionOutcome {
                status: OutcomeStatus::Abandoned,
                ..
            })
        ));
    }
}
