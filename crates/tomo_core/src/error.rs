//! Error taxonomy.
//!
//! Three classes: fatal-to-session errors send the user back to check-in,
//! validation errors are shown inline without navigating, and collaborator
//! failures (narration, ambient audio, completion write) are recoverable.
//! Recoverable failures travel as `anyhow::Error` and are logged where they
//! occur, so only the first two classes have dedicated types.

use thiserror::Error;
use uuid::Uuid;

/// How a caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Abort the session and return to an earlier step.
    Fatal,
    /// Log and continue.
    Recoverable,
    /// Show an inline message; no navigation change.
    Validation,
}

/// Errors that end a session before it can play.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no mood entry was given for this session")]
    MissingEntryId,
    #[error("mood entry {0} was not found")]
    EntryNotFound(Uuid),
    #[error("the mood entry has no target emotion")]
    MissingTargetEmotion,
    #[error("malformed meditation: {0}")]
    MalformedScript(String),
    #[error("could not load the mood entry: {0}")]
    Store(String),
}

impl SessionError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }

    /// Short explanation shown next to the single "start over" action.
    pub fn restart_hint(&self) -> &'static str {
        match self {
            SessionError::MissingEntryId | SessionError::EntryNotFound(_) => {
                "We could not find your check-in."
            }
            SessionError::MissingTargetEmotion => "Choose a direction before starting.",
            SessionError::MalformedScript(_) | SessionError::Store(_) => "Something went wrong.",
        }
    }
}

/// Invalid user input on the check-in and direction steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please choose how you are feeling")]
    EmptyMood,
    #[error("please choose a direction for your meditation")]
    MissingTarget,
    #[error("'{target}' is not one of the directions offered from '{current}'")]
    TargetNotOffered { target: String, current: String },
}

impl ValidationError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(SessionError::MissingTargetEmotion.class(), ErrorClass::Fatal);
        assert_eq!(ValidationError::EmptyMood.class(), ErrorClass::Validation);
    }

    #[test]
    fn test_messages() {
        let id = Uuid::nil();
        assert!(SessionError::EntryNotFound(id).to_string().contains(&id.to_string()));
        assert_eq!(
            SessionError::EntryNotFound(id).restart_hint(),
            "We could not find your check-in."
        );
        let e = ValidationError::TargetNotOffered {
            target: "joyful".into(),
            current: "anxious".into(),
        };
        assert!(e.to_string().contains("joyful"));
    }
}
