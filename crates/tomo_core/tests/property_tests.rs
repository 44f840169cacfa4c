//! Property-based tests for tomo_core.
//!
//! The transition model and colour interpolation are total functions: every
//! input must produce a usable answer.

use proptest::prelude::*;
use tomo_core::color::{color_for, journey_color, DEFAULT_FROM, DEFAULT_TO};
use tomo_core::emotion::{display_for, is_known, targets_for, FALLBACK_TARGETS};
use tomo_core::{MeditationPhase, MeditationScript, PhaseName};

// ============================================================================
// Strategies
// ============================================================================

const KNOWN: &[&str] = &[
    "anxious", "worried", "stressed", "angry", "frustrated", "irritated", "sad", "depressed",
    "lonely", "bored", "confused", "tired", "content", "calm", "happy",
];

fn arb_known_emotion() -> impl Strategy<Value = String> {
    prop::sample::select(KNOWN).prop_map(|s| s.to_string())
}

/// Mixed-case spelling of a known emotion.
fn arb_cased_emotion() -> impl Strategy<Value = String> {
    (arb_known_emotion(), prop::collection::vec(any::<bool>(), 12)).prop_map(|(s, upper)| {
        s.chars()
            .zip(upper.into_iter().cycle())
            .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

fn arb_script() -> impl Strategy<Value = Vec<MeditationPhase>> {
    prop::collection::vec(prop::option::of(1u32..600), 6).prop_map(|durations| {
        PhaseName::ALL
            .iter()
            .zip(durations)
            .map(|(p, d)| MeditationPhase::new(p.as_str(), "breathe", d))
            .collect()
    })
}

// ============================================================================
// Transition model
// ============================================================================

proptest! {
    #[test]
    fn prop_known_emotions_have_three_targets(emotion in arb_cased_emotion()) {
        let targets = targets_for(Some(&emotion));
        prop_assert_eq!(targets.len(), 3);
        prop_assert_ne!(targets, &FALLBACK_TARGETS[..]);
        prop_assert_eq!(targets, targets_for(Some(&emotion.to_lowercase())));
    }

    #[test]
    fn prop_unknown_emotions_fall_back(s in "[a-z]{0,12}") {
        prop_assume!(!is_known(&s));
        prop_assert_eq!(targets_for(Some(&s)), &FALLBACK_TARGETS[..]);
    }

    #[test]
    fn prop_targets_is_idempotent(s in ".{0,16}") {
        prop_assert_eq!(targets_for(Some(&s)), targets_for(Some(&s)));
    }

    #[test]
    fn prop_display_never_fails(s in ".{0,16}") {
        let d = display_for(&s);
        prop_assert!(!d.emoji.is_empty());
        prop_assert!(!d.color.is_empty());
        if d.description == "Finding balance" {
            prop_assert_eq!(d.label.as_ref(), s.as_str());
            prop_assert_eq!(d.emoji, "✨");
        }
    }

    // ========================================================================
    // Colour
    // ========================================================================

    #[test]
    fn prop_journey_color_stays_between_endpoints(
        from in prop::sample::select(KNOWN),
        to in prop::sample::select(KNOWN),
        t in -2.0f32..3.0,
    ) {
        let a = color_for(from).unwrap_or(DEFAULT_FROM);
        let b = color_for(to).unwrap_or(DEFAULT_TO);
        let c = journey_color(from, to, t);
        for (x, lo, hi) in [
            (c.hue, a.hue.min(b.hue), a.hue.max(b.hue)),
            (c.sat, a.sat.min(b.sat), a.sat.max(b.sat)),
            (c.light, a.light.min(b.light), a.light.max(b.light)),
        ] {
            prop_assert!(x >= lo - 1e-3 && x <= hi + 1e-3);
        }
    }

    // ========================================================================
    // Scripts
    // ========================================================================

    #[test]
    fn prop_duration_before_is_monotonic(phases in arb_script()) {
        let script = MeditationScript::new(phases).unwrap();
        let mut last = 0;
        for i in 0..=6 {
            let d = script.duration_before(i);
            prop_assert!(d >= last);
            last = d;
        }
        prop_assert_eq!(last, script.total_duration_secs());
    }
}
