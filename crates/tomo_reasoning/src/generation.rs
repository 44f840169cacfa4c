//! Phase script generation.
//!
//! The model is asked for a bare JSON array, but in practice it sometimes
//! wraps the array in a Markdown fence or drops fields. Fences are tolerated,
//! a missing phase name is filled in, and anything that cannot become exactly
//! six narrated phases is rejected.

use crate::api_types::Message;
use crate::error::GenerationError;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tomo_core::{
    GenerationRequest, InspirationSource, MeditationPhase, NoInspiration, PhaseGenerator,
    PhaseName, TomoConfig, PHASE_COUNT,
};

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Turn model output into six phases of `duration_secs` each.
pub fn parse_phases(
    raw: &str,
    duration_secs: u32,
) -> Result<Vec<MeditationPhase>, GenerationError> {
    let body = strip_code_fences(raw);
    let items: Vec<Value> = serde_json::from_str(body).map_err(|e| {
        tracing::warn!("Failed to parse meditation JSON: {}", e);
        GenerationError::Unparsable {
            raw: raw.to_string(),
        }
    })?;

    if items.len() != PHASE_COUNT {
        return Err(GenerationError::WrongPhaseCount {
            count: items.len(),
            raw: raw.to_string(),
        });
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let text = item
                .get("text")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| GenerationError::MissingText {
                    index,
                    raw: raw.to_string(),
                })?;
            let phase = item
                .get("phase")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_phase_name(index));
            Ok(MeditationPhase::new(phase, text, Some(duration_secs)))
        })
        .collect()
}

fn default_phase_name(index: usize) -> String {
    PhaseName::from_index(index)
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| format!("Phase {}", index + 1))
}

/// LLM-backed [`PhaseGenerator`].
pub struct ScriptGenerator {
    llm: Arc<dyn LlmClient>,
    inspirations: Arc<dyn InspirationSource>,
    params: CompletionParams,
    inspiration_count: usize,
    phase_duration_secs: u32,
}

impl ScriptGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            inspirations: Arc::new(NoInspiration),
            params: CompletionParams::default(),
            inspiration_count: 10,
            phase_duration_secs: 30,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &TomoConfig) -> Self {
        Self::new(llm)
            .with_params(CompletionParams {
                max_tokens: config.llm.max_tokens,
                temperature: config.llm.temperature,
            })
            .with_inspiration_count(config.llm.inspiration_count)
            .with_phase_duration(config.session.generated_phase_duration_secs)
    }

    pub fn with_inspirations(mut self, source: Arc<dyn InspirationSource>) -> Self {
        self.inspirations = source;
        self
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_inspiration_count(mut self, count: usize) -> Self {
        self.inspiration_count = count;
        self
    }

    pub fn with_phase_duration(mut self, secs: u32) -> Self {
        self.phase_duration_secs = secs.max(1);
        self
    }

    pub async fn generate_phases(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<MeditationPhase>, GenerationError> {
        let current = request.current_emotion.trim();
        let target = request
            .target_emotion
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if current.is_empty() || target.is_empty() {
            return Err(GenerationError::MissingEmotion);
        }

        let lines = match self
            .inspirations
            .inspirations(current, target, self.inspiration_count)
            .await
        {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Inspiration lookup failed, continuing without: {:#}", e);
                Vec::new()
            }
        };
        tracing::debug!(
            "Generating {} → {} with {} inspiration lines via {}",
            current,
            target,
            lines.len(),
            self.llm.provider_name()
        );

        let response = self
            .llm
            .complete(
                prompts::system_prompt(),
                vec![Message::user(prompts::user_prompt(request, &lines))],
                self.params.clone(),
            )
            .await
            .map_err(GenerationError::Upstream)?;

        parse_phases(&response.text, self.phase_duration_secs).inspect_err(|e| {
            tracing::warn!("Unusable generation output ({}): {}", e, response.text);
        })
    }
}

#[async_trait]
impl PhaseGenerator for ScriptGenerator {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<Vec<MeditationPhase>> {
        Ok(self.generate_phases(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six(item: impl Fn(usize) -> String) -> String {
        format!("[{}]", (0..6).map(item).collect::<Vec<_>>().join(","))
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]```"), "[1]");
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
    }

    #[test]
    fn test_parse_assigns_duration() {
        let raw = six(|i| format!(r#"{{"phase":"P{i}","text":"t{i}"}}"#));
        let phases = parse_phases(&raw, 30).unwrap();
        assert_eq!(phases.len(), 6);
        assert_eq!(phases[3].phase, "P3");
        assert!(phases.iter().all(|p| p.duration_secs() == 30));
    }

    #[test]
    fn test_parse_fenced_output() {
        let raw = format!("```json\n{}\n```", six(|i| format!(r#"{{"text":"t{i}"}}"#)));
        let phases = parse_phases(&raw, 30).unwrap();
        assert_eq!(phases[0].phase, "Awareness");
        assert_eq!(phases[5].phase, "Maintenance");
    }

    #[test]
    fn test_parse_wrong_count() {
        let raw = r#"[{"phase":"a","text":"b"}]"#;
        match parse_phases(raw, 30) {
            Err(GenerationError::WrongPhaseCount { count, raw: kept }) => {
                assert_eq!(count, 1);
                assert_eq!(kept, raw);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(
            parse_phases("Here is your meditation!", 30),
            Err(GenerationError::Unparsable { .. })
        ));
        assert!(matches!(
            parse_phases(r#"{"phases": []}"#, 30),
            Err(GenerationError::Unparsable { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_text() {
        let raw = six(|i| {
            if i == 4 {
                r#"{"phase":"Integration","text":"   "}"#.to_string()
            } else {
                format!(r#"{{"phase":"P{i}","text":"t{i}"}}"#)
            }
        });
        assert!(matches!(
            parse_phases(&raw, 30),
            Err(GenerationError::MissingText { index: 4, .. })
        ));
    }

    #[test]
    fn test_default_phase_name_beyond_six() {
        assert_eq!(default_phase_name(0), "Awareness");
        assert_eq!(default_phase_name(7), "Phase 8");
    }
}
