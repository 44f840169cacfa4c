//! Prompt text for phase generation.

use tomo_core::{GenerationRequest, InspirationLine};

const SYSTEM_PROMPT: &str = "\
You are a safe, supportive meditation guide.

Write a guided meditation in exactly 6 phases:
1. Awareness - acknowledge the current emotion with gentle observation.
2. Acceptance - normalize and validate the feeling.
3. Processing - introduce one technique (breathing, grounding, or body scan).
4. Reframing - gently offer a new perspective, no toxic positivity.
5. Integration - invite the target emotion to grow naturally.
6. Maintenance - suggest a simple way to carry it into daily life.

Requirements:
- Each phase should last 30 seconds when read aloud.
- Tone: warm, compassionate, clear. No medical/therapeutic claims.
- Use the \"inspiration lines\" as raw material; adapt rather than copy.
- Personalize lightly using the user's note if present.
- Return ONLY a JSON array of 6 items with keys \"phase\" and \"text\".
- Output ONLY a valid JSON array. Do not include markdown, code fences, or explanations.
";

const NO_INSPIRATION: &str = "- (no inspiration found; write a gentle generic meditation)";

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

pub fn format_inspirations(lines: &[InspirationLine]) -> String {
    if lines.is_empty() {
        return NO_INSPIRATION.to_string();
    }
    lines
        .iter()
        .map(|l| format!("- ({}→{}) {}", l.current_emotion, l.target_emotion, l.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user_prompt(request: &GenerationRequest, inspirations: &[InspirationLine]) -> String {
    let note = request
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("(none)");
    format!(
        "Current emotion: {}\nTarget emotion: {}\nUser note: {}\n\nInspiration lines:\n{}\n",
        request.current_emotion,
        request.target_emotion.as_deref().unwrap_or_default(),
        note,
        format_inspirations(inspirations)
    )
}
