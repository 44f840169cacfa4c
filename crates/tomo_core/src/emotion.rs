//! Emotion Transition Model
//!
//! A static map from the emotion a user checks in with to the small, ordered
//! set of emotions a meditation can guide them toward, plus display metadata
//! for every target. Fan-out is deliberately capped at three per source.
//!
//! Every lookup is total: unknown or missing emotions resolve to fixed
//! fallbacks, so a caller can always offer a direction.

use serde::Serialize;
use std::borrow::Cow;

/// Directions offered when the current emotion is missing or unknown.
pub const FALLBACK_TARGETS: [&str; 3] = ["calm", "peaceful", "content"];

/// Palette token used for emotions without display metadata.
pub const DEFAULT_DISPLAY_COLOR: &str = "purple-600";

// Grouped by arousal/valence: high-arousal negative states head toward low
// arousal, low-arousal negative states shift valence, positive states deepen.
const PROGRESSIONS: &[(&str, [&str; 3])] = &[
    ("anxious", ["calm", "grounded", "peaceful"]),
    ("worried", ["calm", "accepting", "peaceful"]),
    ("stressed", ["relaxed", "calm", "peaceful"]),
    ("angry", ["calm", "accepting", "peaceful"]),
    ("frustrated", ["patient", "calm", "accepting"]),
    ("irritated", ["calm", "patient", "accepting"]),
    ("sad", ["accepting", "content", "peaceful"]),
    ("depressed", ["accepting", "hopeful", "calm"]),
    ("lonely", ["connected", "accepting", "peaceful"]),
    ("bored", ["curious", "interested", "content"]),
    ("confused", ["clear", "focused", "understanding"]),
    ("tired", ["rested", "peaceful", "calm"]),
    ("content", ["grateful", "joyful", "energized"]),
    ("calm", ["peaceful", "grateful", "content"]),
    ("happy", ["joyful", "grateful", "energized"]),
];

/// Display metadata for a target emotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionDisplay {
    pub label: Cow<'static, str>,
    pub description: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
}

const fn display(
    label: &'static str,
    description: &'static str,
    emoji: &'static str,
    color: &'static str,
) -> EmotionDisplay {
    EmotionDisplay {
        label: Cow::Borrowed(label),
        description,
        emoji,
        color,
    }
}

const DISPLAY: &[(&str, EmotionDisplay)] = &[
    ("calm", display("Calm", "Peace and serenity", "🌿", "teal-600")),
    ("peaceful", display("Peaceful", "Inner stillness", "☮️", "blue-600")),
    ("content", display("Content", "Gentle satisfaction", "😊", "orange-600")),
    ("accepting", display("Accepting", "Allowing what is", "🤲", "amber-600")),
    ("patient", display("Patient", "Steady and calm", "🐢", "yellow-600")),
    ("grounded", display("Grounded", "Centered and stable", "🌱", "green-700")),
    ("hopeful", display("Hopeful", "Looking forward", "🌈", "sky-500")),
    ("connected", display("Connected", "In touch with others", "🤝", "rose-500")),
    ("curious", display("Curious", "Open to discovery", "🪶", "indigo-500")),
    ("joyful", display("Joyful", "Light and radiant", "☀️", "yellow-400")),
    ("energized", display("Energized", "Alive and vibrant", "⚡", "lime-500")),
    ("relaxed", display("Relaxed", "Ease and comfort", "😌", "cyan-600")),
];

/// A mood offered on the check-in screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckInMood {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

const fn mood(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    emoji: &'static str,
) -> CheckInMood {
    CheckInMood {
        id,
        label,
        description,
        emoji,
    }
}

const CHECK_IN_MOODS: &[CheckInMood] = &[
    mood("calm", "Calm", "Feeling peaceful and centered", "😌"),
    mood("happy", "Happy", "Joyful and optimistic", "😊"),
    mood("anxious", "Anxious", "Worried or restless", "😟"),
    mood("sad", "Sad", "Feeling down or melancholy", "😢"),
    mood("frustrated", "Frustrated", "Annoyed or stressed", "😤"),
    mood("confused", "Confused", "Uncertain or overwhelmed", "😕"),
];

fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Ordered target emotions reachable from `current`.
///
/// Case-insensitive. Returns [`FALLBACK_TARGETS`] for `None`, empty, or
/// unrecognized input.
pub fn targets_for(current: Option<&str>) -> &'static [&'static str] {
    let Some(current) = current else {
        return &FALLBACK_TARGETS;
    };
    let key = normalize(current);
    PROGRESSIONS
        .iter()
        .find(|(source, _)| *source == key)
        .map(|(_, targets)| targets.as_slice())
        .unwrap_or(&FALLBACK_TARGETS)
}

/// Whether `id` is a source emotion in the transition table.
pub fn is_known(id: &str) -> bool {
    let key = normalize(id);
    PROGRESSIONS.iter().any(|(source, _)| *source == key)
}

/// Display metadata for an emotion id. Never fails: unknown ids get a
/// "finding balance" placeholder labelled with the id as given.
pub fn display_for(id: &str) -> EmotionDisplay {
    let key = normalize(id);
    DISPLAY
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, d)| d.clone())
        .unwrap_or_else(|| EmotionDisplay {
            label: Cow::Owned(id.to_string()),
            description: "Finding balance",
            emoji: "✨",
            color: DEFAULT_DISPLAY_COLOR,
        })
}

/// Moods offered when checking in.
pub fn check_in_moods() -> &'static [CheckInMood] {
    CHECK_IN_MOODS
}
