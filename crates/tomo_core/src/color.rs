//! Hue/saturation/lightness colours for the session background.
//!
//! The background drifts from the colour of the emotion a user checked in
//! with toward the colour of their target as the session progresses.

use serde::{Deserialize, Serialize};

/// A colour in HSL space: hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f32,
    pub sat: f32,
    pub light: f32,
}

impl Hsl {
    pub const fn new(hue: f32, sat: f32, light: f32) -> Self {
        Self { hue, sat, light }
    }

    /// Linear interpolation toward `to`. `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, to: &Hsl, t: f32) -> Hsl {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Hsl {
            hue: self.hue + (to.hue - self.hue) * t,
            sat: self.sat + (to.sat - self.sat) * t,
            light: self.light + (to.light - self.light) * t,
        }
    }

    /// CSS notation, e.g. `hsl(180, 50%, 55%)`.
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            round1(self.hue),
            round1(self.sat),
            round1(self.light)
        )
    }
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

const PALETTE: &[(&str, Hsl)] = &[
    ("sad", Hsl::new(210.0, 60.0, 40.0)),
    ("anxious", Hsl::new(150.0, 50.0, 45.0)),
    ("angry", Hsl::new(0.0, 70.0, 50.0)),
    ("frustrated", Hsl::new(30.0, 65.0, 48.0)),
    ("confused", Hsl::new(280.0, 45.0, 50.0)),
    ("calm", Hsl::new(180.0, 50.0, 55.0)),
    ("content", Hsl::new(45.0, 70.0, 60.0)),
    ("peaceful", Hsl::new(240.0, 40.0, 50.0)),
    ("grateful", Hsl::new(270.0, 55.0, 58.0)),
    ("happy", Hsl::new(50.0, 80.0, 65.0)),
];

/// Starting colour when the current emotion has no palette entry.
pub const DEFAULT_FROM: Hsl = Hsl::new(180.0, 50.0, 55.0);
/// Destination colour when the target emotion has no palette entry.
pub const DEFAULT_TO: Hsl = Hsl::new(240.0, 40.0, 50.0);

/// Palette colour for an emotion, if it has one.
pub fn color_for(emotion: &str) -> Option<Hsl> {
    let key = emotion.trim().to_lowercase();
    PALETTE.iter().find(|(id, _)| *id == key).map(|(_, c)| *c)
}

/// Background colour at `progress` (0.0 = start of the session, 1.0 = final
/// phase) for a journey from `current` to `target`.
pub fn journey_color(current: &str, target: &str, progress: f32) -> Hsl {
    let from = color_for(current).unwrap_or(DEFAULT_FROM);
    let to = color_for(target).unwrap_or(DEFAULT_TO);
    from.lerp(&to, progress)
}
