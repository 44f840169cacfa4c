//! # Tomo session engine
//!
//! Plays a six-phase meditation from start to the single completion record.
//!
//! ## Architecture
//!
//! A session runs as one background task, continuously:
//! 1. Advancing the [`Playback`] state machine from a one-second clock
//! 2. Applying play/pause/skip/end commands from the [`SessionHandle`]
//! 3. Driving narration and ambient audio through the injected collaborators
//! 4. Publishing [`PlaybackSnapshot`]s to whoever renders the session
//!
//! ## Failure model
//!
//! - Loading errors (missing entry, missing target, malformed phases) are fatal
//! - Narration, ambient audio and the completion write are best-effort

mod ambient;
mod heartbeat;
mod narration;
mod playback;
mod runner;

pub use ambient::AmbientLibrary;
pub use heartbeat::TickConfig;
pub use narration::{NarrationController, NarrationReady};
pub use playback::{Command, Playback, PlaybackSnapshot, PlaybackStatus, Transition};
pub use runner::{OutcomeStatus, SessionHandle, SessionOutcome, SessionRunner};
