//! # Tomo reasoning
//!
//! The two network services a journey depends on: six-phase script
//! generation through a chat-completions model, and phase narration through a
//! speech endpoint. Both speak the OpenAI wire format and retry transient
//! failures.

pub mod api_types;
pub mod error;
pub mod generation;
pub mod llm;
pub mod prompts;
pub mod providers;
pub mod retry;
pub mod tts;

pub use error::GenerationError;
pub use generation::{parse_phases, strip_code_fences, ScriptGenerator};
pub use llm::{CompletionParams, LlmClient};
pub use providers::create_client;
pub use tts::OpenAiSpeech;
