use async_trait::async_trait;
use stembot_core::AsrError;

/// A speech-recognition engine that turns one window of mono f32 audio
/// into text.
///
/// Implementations are registered via [`EngineRegistry`](crate::EngineRegistry)
/// and called once per accumulated window by the transcription worker;
/// each window is independent.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Returns the engine's registry name (e.g. `"whisper"`, `"null"`).
    fn name(&self) -> &str;
    /// One-time initialisation with engine-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError>;
    /// Transcribe one audio window. The returned text is not yet trimmed.
    async fn transcribe(&self, audio: Vec<f32>) -> Result<String, AsrError>;
    /// Gracefully shut down the engine, releasing resources.
    async fn shutdown(&self) -> Result<(), AsrError>;
}
