//! Plain-text rendering of menus, snapshots and history.

use tomo_core::emotion::check_in_moods;
use tomo_core::{display_for, targets_for, MoodEntry, SessionStats};
use tomo_session::{OutcomeStatus, PlaybackSnapshot, PlaybackStatus, SessionOutcome};

const BAR_WIDTH: usize = 20;

pub fn clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn bar(fraction: f32) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn status_label(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "playing",
        PlaybackStatus::Paused => "paused",
        PlaybackStatus::Completing => "finishing",
        PlaybackStatus::Completed => "complete",
    }
}

pub fn mood_menu() -> String {
    let mut out = String::from("How are you feeling right now?\n");
    for (i, mood) in check_in_moods().iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} {} - {}\n",
            i + 1,
            mood.emoji,
            mood.label,
            mood.description
        ));
    }
    out.push_str("Pick a number or type your own word.");
    out
}

/// The numbered list of directions offered from `current`.
pub fn targets_menu(current: &str) -> String {
    let mut out = format!("Where would you like to go from {}?\n", current);
    for (i, target) in targets_for(Some(current)).iter().enumerate() {
        let d = display_for(target);
        out.push_str(&format!(
            "  {}. {} {} - {} ({})\n",
            i + 1,
            d.emoji,
            d.label,
            d.description,
            d.color
        ));
    }
    out.pop();
    out
}

pub fn phase_banner(snap: &PlaybackSnapshot) -> String {
    format!(
        "\n[{}/{}] {} ({})\n{}\n",
        snap.phase_index + 1,
        snap.phase_count,
        snap.phase_name,
        clock(snap.phase_duration),
        snap.text
    )
}

pub fn progress_line(snap: &PlaybackSnapshot) -> String {
    format!(
        "{:<9} {} {}/{}  total {:>3.0}%  {}",
        status_label(snap.status),
        bar(snap.phase_progress),
        clock(snap.elapsed_in_phase),
        clock(snap.phase_duration),
        snap.total_progress * 100.0,
        snap.background.to_css()
    )
}

pub fn outcome_summary(outcome: &SessionOutcome) -> String {
    match (outcome.status, &outcome.record) {
        (OutcomeStatus::Completed, Some(_)) => format!(
            "Meditation complete. {} of practice recorded.",
            clock(outcome.elapsed_seconds)
        ),
        (OutcomeStatus::Completed, None) => format!(
            "Meditation complete after {}. The session could not be saved.",
            clock(outcome.elapsed_seconds)
        ),
        (OutcomeStatus::Abandoned, _) => "Session left early. Nothing was recorded.".to_string(),
    }
}

pub fn history(entries: &[MoodEntry], stats: &SessionStats) -> String {
    let mut out = format!(
        "{} sessions ({} completed), {} minutes of practice\n",
        stats.sessions,
        stats.completed,
        stats.total_minutes()
    );
    if entries.is_empty() {
        out.push_str("No check-ins yet.");
        return out;
    }
    for entry in entries {
        let direction = entry
            .target_emotion
            .as_deref()
            .map(|t| format!(" -> {}", t))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {}  {}{}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.current_emotion,
            direction
        ));
        if let Some(note) = &entry.note {
            out.push_str(&format!("  \"{}\"", note));
        }
        out.push('\n');
    }
    out.pop();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tomo_core::Hsl;
    use uuid::Uuid;

    fn snapshot(status: PlaybackStatus, elapsed: u32) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status,
            phase_index: 1,
            phase_count: 6,
            phase_name: "Acceptance".into(),
            text: "Let it be.".into(),
            elapsed_in_phase: elapsed,
            phase_duration: 90,
            phase_progress: elapsed as f32 / 90.0,
            total_progress: (1.0 + elapsed as f32 / 90.0) / 6.0,
            journey_progress: 0.2,
            background: Hsl::new(180.0, 50.0, 55.0),
            elapsed_seconds: 90 + elapsed,
        }
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "0:00");
        assert_eq!(clock(90), "1:30");
        assert_eq!(clock(605), "10:05");
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(bar(1.5), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_targets_menu_numbers_directions() {
        let menu = targets_menu("anxious");
        assert!(menu.starts_with("Where would you like to go from anxious?"));
        assert!(menu.contains("  1. 🌿 Calm - Peace and serenity (teal-600)"));
        assert!(menu.contains("  3. "));
        assert!(!menu.contains("  4. "));
    }

    #[test]
    fn test_mood_menu_lists_check_in_moods() {
        let menu = mood_menu();
        assert!(menu.contains("1. 😌 Calm"));
        assert!(menu.contains("6. 😕 Confused"));
    }

    #[test]
    fn test_snapshot_rendering() {
        let snap = snapshot(PlaybackStatus::Paused, 45);
        assert_eq!(phase_banner(&snap), "\n[2/6] Acceptance (1:30)\nLet it be.\n");
        let line = progress_line(&snap);
        assert!(line.starts_with("paused "));
        assert!(line.contains("0:45/1:30"));
        assert!(line.contains("total  25%"));
        assert!(line.ends_with("hsl(180, 50%, 55%)"));
    }

    #[test]
    fn test_outcome_summary() {
        let done = SessionOutcome {
            status: OutcomeStatus::Completed,
            elapsed_seconds: 200,
            record: None,
        };
        assert!(outcome_summary(&done).contains("could not be saved"));
        let left = SessionOutcome {
            status: OutcomeStatus::Abandoned,
            elapsed_seconds: 12,
            record: None,
        };
        assert!(outcome_summary(&left).contains("Nothing was recorded"));
    }

    #[test]
    fn test_history() {
        let stats = SessionStats {
            sessions: 2,
            completed: 2,
            total_seconds: 540,
        };
        assert!(history(&[], &stats).ends_with("No check-ins yet."));

        let entry = MoodEntry {
            id: Uuid::new_v4(),
            user_id: "local".into(),
            current_emotion: "sad".into(),
            target_emotion: Some("accepting".into()),
            note: Some("rainy day".into()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
        };
        let text = history(&[entry], &stats);
        assert!(text.starts_with("2 sessions (2 completed), 9 minutes of practice"));
        assert!(text.ends_with("  2024-03-01 08:30  sad -> accepting  \"rainy day\""));
    }
}
