use crate::engine_trait::SpeechEngine;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use stembot_core::AsrError;

/// Test double: counts transcriptions and either replays a scripted list
/// of responses or echoes the window size.
pub struct NullEngine {
    transcribe_count: AtomicUsize,
    script: Mutex<VecDeque<String>>,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            transcribe_count: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Engine that returns the given responses in order, then falls back
    /// to the default echo text.
    pub fn with_script<S: Into<String>>(responses: Vec<S>) -> Self {
        let engine = Self::new();
        {
            let mut script = engine.script.lock().unwrap();
            script.extend(responses.into_iter().map(Into::into));
        }
        engine
    }

    pub fn transcribe_count(&self) -> usize {
        self.transcribe_count.load(Ordering::Relaxed)
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), AsrError> {
        Ok(())
    }

    async fn transcribe(&self, audio: Vec<f32>) -> Result<String, AsrError> {
        let count = self.transcribe_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("NullEngine window #{count}, {} samples", audio.len());

        let scripted = self.script.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| format!("[null] {} samples", audio.len())))
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}
