//! Cancellable narration requests.
//!
//! Only one synthesis task is alive per session. Starting a new one aborts the
//! previous task and bumps the generation counter, so a result that was already
//! on its way is recognised as stale and dropped by the receiver.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tomo_core::NarrationSynth;

/// Synthesized audio for one phase.
#[derive(Debug)]
pub struct NarrationReady {
    pub generation: u64,
    pub phase_index: usize,
    pub audio: Vec<u8>,
}

pub struct NarrationController {
    synth: Option<Arc<dyn NarrationSynth>>,
    ready_tx: mpsc::Sender<NarrationReady>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl NarrationController {
    /// `synth = None` disables narration; every request becomes a no-op.
    pub fn new(
        synth: Option<Arc<dyn NarrationSynth>>,
        ready_tx: mpsc::Sender<NarrationReady>,
    ) -> Self {
        Self {
            synth,
            ready_tx,
            generation: 0,
            task: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.synth.is_some()
    }

    /// Request narration for a phase, superseding any pending request.
    /// Returns the generation the result will carry.
    pub fn start(&mut self, phase_index: usize, text: &str) -> u64 {
        self.cancel();
        let generation = self.generation;

        let Some(synth) = self.synth.clone() else {
            return generation;
        };
        let ready_tx = self.ready_tx.clone();
        let text = text.to_string();

        tracing::debug!(
            "Narration requested for phase {} (generation {}, voice {})",
            phase_index,
            generation,
            synth.voice_id()
        );

        self.task = Some(tokio::spawn(async move {
            match synth.synthesize(&text).await {
                Ok(audio) if audio.is_empty() => {
                    tracing::warn!("{} returned empty narration audio", synth.provider_name());
                }
                Ok(audio) => {
                    let _ = ready_tx
                        .send(NarrationReady {
                            generation,
                            phase_index,
                            audio,
                        })
                        .await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Narration for phase {} failed ({}): {:#}",
                        phase_index,
                        synth.provider_name(),
                        e
                    );
                }
            }
        }));

        generation
    }

    /// Abort the in-flight request, if any. Results already queued become stale.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}

impl Drop for NarrationController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
