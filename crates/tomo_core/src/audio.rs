//! Audio output contract.
//!
//! The playback engine drives an [`AudioSink`] but never depends on it
//! succeeding: every failure is logged by the caller and the session keeps
//! its visual/timer track.

use anyhow::Result;
use std::path::PathBuf;

/// A looping background asset chosen for a target emotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientTrack {
    pub emotion: String,
    pub path: PathBuf,
}

pub trait AudioSink: Send + Sync {
    /// Load and loop `track`. Starts paused; follow with [`AudioSink::set_playing`].
    fn start_ambient(&self, track: &AmbientTrack) -> Result<()>;

    /// Play or pause everything currently loaded, in lockstep with the session.
    fn set_playing(&self, playing: bool) -> Result<()>;

    /// Replace any current narration with `audio` for phase `phase_index`.
    /// It follows the current play/pause state.
    fn play_narration(&self, phase_index: usize, audio: Vec<u8>) -> Result<()>;

    fn stop_narration(&self) -> Result<()>;

    /// Stop and unload all audio resources.
    fn stop_all(&self) -> Result<()>;
}

/// Discards all audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn start_ambient(&self, _track: &AmbientTrack) -> Result<()> {
        Ok(())
    }

    fn set_playing(&self, _playing: bool) -> Result<()> {
        Ok(())
    }

    fn play_narration(&self, _phase_index: usize, _audio: Vec<u8>) -> Result<()> {
        Ok(())
    }

    fn stop_narration(&self) -> Result<()> {
        Ok(())
    }

    fn stop_all(&self) -> Result<()> {
        Ok(())
    }
}
