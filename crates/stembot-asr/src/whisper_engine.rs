use crate::engine_trait::SpeechEngine;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use stembot_core::AsrError;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper speech recognition via whisper.cpp.
///
/// The model is loaded once at initialisation; each window is decoded
/// greedily at temperature 0 so repeated runs over the same audio are
/// deterministic. Inference is CPU-bound and runs under `spawn_blocking`.
pub struct WhisperEngine {
    context: Option<Arc<Mutex<WhisperContext>>>,
    language: String,
}

impl WhisperEngine {
    pub fn new() -> Self {
        Self {
            context: None,
            language: "no".to_string(),
        }
    }
}

impl Default for WhisperEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for WhisperEngine {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError> {
        let model_path = config
            .get("model_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AsrError::InitializationFailed("missing 'model_path' in whisper config".to_string())
            })?
            .to_string();

        if let Some(lang) = config.get("language").and_then(|v| v.as_str()) {
            self.language = lang.to_string();
        }

        tracing::info!(model_path = %model_path, language = %self.language, "loading whisper model");
        let context =
            WhisperContext::new_with_params(&model_path, WhisperContextParameters::default())
                .map_err(|e| {
                    AsrError::InitializationFailed(format!(
                        "failed to load whisper model from {}: {}",
                        model_path, e
                    ))
                })?;

        self.context = Some(Arc::new(Mutex::new(context)));
        Ok(())
    }

    async fn transcribe(&self, audio: Vec<f32>) -> Result<String, AsrError> {
        let context = self
            .context
            .as_ref()
            .ok_or_else(|| AsrError::ProcessingFailed("engine not initialized".to_string()))?
            .clone();
        let language = self.language.clone();

        tokio::task::spawn_blocking(move || {
            let guard = context
                .lock()
                .map_err(|_| AsrError::ProcessingFailed("failed to lock whisper context".to_string()))?;
            let mut state = guard
                .create_state()
                .map_err(|e| AsrError::ProcessingFailed(format!("failed to create state: {}", e)))?;

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_language(Some(&language));
            params.set_temperature(0.0);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);
            params.set_no_context(true);
            let threads = std::thread::available_parallelism()
                .map(|n| n.get() as i32)
                .unwrap_or(4);
            params.set_n_threads(std::cmp::max(1, threads - 1));

            state
                .full(params, &audio)
                .map_err(|e| AsrError::ProcessingFailed(format!("whisper full() failed: {}", e)))?;

            let mut text = String::new();
            let count = state
                .full_n_segments()
                .map_err(|e| AsrError::ProcessingFailed(e.to_string()))?;
            for i in 0..count {
                let segment = state
                    .full_get_segment_text(i)
                    .map_err(|e| AsrError::ProcessingFailed(e.to_string()))?;
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(segment.trim());
            }

            Ok(text)
        })
        .await
        .map_err(|e| AsrError::ProcessingFailed(format!("transcription task panicked: {}", e)))?
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}
