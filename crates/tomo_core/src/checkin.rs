//! Check-in and direction input validation.

use crate::emotion::targets_for;
use crate::error::ValidationError;

/// A validated check-in, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub current_emotion: String,
    pub note: Option<String>,
}

pub fn validate_check_in(mood: &str, note: Option<&str>) -> Result<CheckIn, ValidationError> {
    let current_emotion = mood.trim().to_lowercase();
    if current_emotion.is_empty() {
        return Err(ValidationError::EmptyMood);
    }
    let note = note
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    Ok(CheckIn {
        current_emotion,
        note,
    })
}

/// Validate the direction chosen for `current`. Returns the normalized target.
pub fn validate_direction(
    current: &str,
    selected: Option<&str>,
) -> Result<String, ValidationError> {
    let target = selected
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingTarget)?;
    if !targets_for(Some(current)).iter().any(|t| *t == target) {
        return Err(ValidationError::TargetNotOffered {
            target,
            current: current.to_string(),
        });
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_normalizes() {
        let c = validate_check_in("  Anxious ", Some("  big exam tomorrow ")).unwrap();
        assert_eq!(c.current_emotion, "anxious");
        assert_eq!(c.note.as_deref(), Some("big exam tomorrow"));
    }

    #[test]
    fn test_check_in_empty_mood() {
        assert_eq!(validate_check_in("   ", None), Err(ValidationError::EmptyMood));
    }

    #[test]
    fn test_blank_note_is_none() {
        assert_eq!(validate_check_in("sad", Some("  ")).unwrap().note, None);
    }

    #[test]
    fn test_direction() {
        assert_eq!(validate_direction("anxious", Some("Grounded")).unwrap(), "grounded");
        assert_eq!(validate_direction("anxious", None), Err(ValidationError::MissingTarget));
        assert_eq!(validate_direction("anxious", Some(" ")), Err(ValidationError::MissingTarget));
        assert!(matches!(
            validate_direction("anxious", Some("joyful")),
            Err(ValidationError::TargetNotOffered { .. })
        ));
    }

    #[test]
    fn test_direction_from_unknown_mood_uses_fallback() {
        assert_eq!(validate_direction("elated", Some("peaceful")).unwrap(), "peaceful");
    }
}
