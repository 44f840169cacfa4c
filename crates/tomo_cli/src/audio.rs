//! File-backed audio output.
//!
//! A terminal has no mixer, so narration clips are written to disk as
//! `phase-N.mp3` and every transport change is appended to `audio.log`,
//! where any external player can pick them up.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tomo_core::{AmbientTrack, AudioSink};

#[derive(Debug, Default)]
struct SinkState {
    playing: bool,
    ambient: Option<AmbientTrack>,
    narration: Option<PathBuf>,
}

pub struct FileAudioSink {
    dir: PathBuf,
    state: Mutex<SinkState>,
}

impl FileAudioSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create audio output dir {}", dir.display()))?;
        Ok(Self {
            dir,
            state: Mutex::new(SinkState::default()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the clip for a zero-based phase index.
    pub fn narration_path(&self, phase_index: usize) -> PathBuf {
        self.dir.join(format!("phase-{}.mp3", phase_index + 1))
    }

    fn state(&self) -> Result<MutexGuard<'_, SinkState>> {
        self.state
            .lock()
            .map_err(|_| anyhow::anyhow!("audio state lock poisoned"))
    }

    fn log(&self, event: &str) -> Result<()> {
        let path = self.dir.join("audio.log");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        writeln!(file, "{} {}", chrono::Utc::now().to_rfc3339(), event)
            .context("Failed to append audio log")
    }
}

impl AudioSink for FileAudioSink {
    fn start_ambient(&self, track: &AmbientTrack) -> Result<()> {
        self.state()?.ambient = Some(track.clone());
        self.log(&format!("ambient {} {}", track.emotion, track.path.display()))
    }

    fn set_playing(&self, playing: bool) -> Result<()> {
        self.state()?.playing = playing;
        self.log(if playing { "play" } else { "pause" })
    }

    fn play_narration(&self, phase_index: usize, audio: Vec<u8>) -> Result<()> {
        let path = self.narration_path(phase_index);
        fs::write(&path, &audio)
            .with_context(|| format!("Failed to write narration to {}", path.display()))?;
        let playing = {
            let mut state = self.state()?;
            state.narration = Some(path.clone());
            state.playing
        };
        self.log(&format!(
            "narration {} ({} bytes, {})",
            path.display(),
            audio.len(),
            if playing { "playing" } else { "paused" }
        ))
    }

    fn stop_narration(&self) -> Result<()> {
        if self.state()?.narration.take().is_some() {
            self.log("narration stopped")?;
        }
        Ok(())
    }

    fn stop_all(&self) -> Result<()> {
        *self.state()? = SinkState::default();
        self.log("stop")
    }
}
