use crate::engine_trait::SpeechEngine;
use std::time::{SystemTime, UNIX_EPOCH};
use stembot_core::{AudioChunk, Transcript};
use tokio::sync::mpsc;

/// Accumulates captured audio into fixed-length windows and produces
/// transcripts at that cadence.
///
/// Each window is independent: the buffer is reset after every
/// transcription attempt, successful or not, so words can split across
/// window boundaries. That limitation is accepted; there is no VAD and
/// no overlap.
pub struct TranscriptionWorker {
    engine: Box<dyn SpeechEngine>,
    window_samples: usize,
    transcript_tx: mpsc::UnboundedSender<Transcript>,
    transcript_rx: Option<mpsc::UnboundedReceiver<Transcript>>,
}

impl TranscriptionWorker {
    pub fn new(engine: Box<dyn SpeechEngine>, window_samples: usize) -> Self {
        let (transcript_tx, transcript_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            window_samples,
            transcript_tx,
            transcript_rx: Some(transcript_rx),
        }
    }

    pub fn take_transcript_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<Transcript>> {
        self.transcript_rx.take()
    }

    /// Spawn the worker task. Runs until the frame channel closes.
    pub fn start(
        self,
        mut frame_rx: mpsc::UnboundedReceiver<AudioChunk>,
    ) -> tokio::task::JoinHandle<()> {
        let engine = self.engine;
        let window_samples = self.window_samples;
        let transcript_tx = self.transcript_tx;

        tokio::spawn(async move {
            tracing::info!(engine = engine.name(), "transcription worker ready");

            let mut buffer: Vec<f32> = Vec::new();

            while let Some(chunk) = frame_rx.recv().await {
                buffer.extend_from_slice(&chunk.samples);

                if buffer.len() < window_samples {
                    continue;
                }

                // One transcription per window; the buffer is reset
                // regardless of the outcome.
                let audio = std::mem::take(&mut buffer);
                match engine.transcribe(audio).await {
                    Ok(text) => {
                        let text = text.trim().to_string();
                        if text.is_empty() {
                            continue;
                        }
                        tracing::info!("TEXT: {}", text);
                        let transcript = Transcript {
                            text,
                            timestamp: unix_timestamp(),
                        };
                        let _ = transcript_tx.send(transcript);
                    }
                    Err(e) => {
                        tracing::warn!("transcription failed: {}", e);
                    }
                }
            }

            tracing::debug!("frame channel closed, transcription worker shutting down");
            if let Err(e) = engine.shutdown().await {
                tracing::warn!("engine shutdown failed: {}", e);
            }
        })
    }
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::null_engine::NullEngine;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use stembot_core::AsrError;

    const SAMPLE_RATE: u32 = 16000;

    fn chunk(samples: usize) -> AudioChunk {
        AudioChunk {
            samples: vec![0.0; samples],
            sample_rate: SAMPLE_RATE,
            channels: 1,
        }
    }

    async fn recv_timeout(
        rx: &mut mpsc::UnboundedReceiver<Transcript>,
    ) -> Option<Transcript> {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for transcript")
    }

    #[tokio::test]
    async fn test_worker_exact_window_triggers_one_transcription() {
        let mut worker = TranscriptionWorker::new(Box::new(NullEngine::new()), 8000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        // Frames summing to exactly one window
        for _ in 0..4 {
            frame_tx.send(chunk(2000)).unwrap();
        }
        let transcript = recv_timeout(&mut transcript_rx).await.unwrap();
        assert_eq!(transcript.text, "[null] 8000 samples");

        drop(frame_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_resets_buffer_between_windows() {
        let mut worker = TranscriptionWorker::new(Box::new(NullEngine::new()), 8000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        for _ in 0..8 {
            frame_tx.send(chunk(2000)).unwrap();
        }
        // Two full windows, each transcribed from a fresh buffer
        let first = recv_timeout(&mut transcript_rx).await.unwrap();
        let second = recv_timeout(&mut transcript_rx).await.unwrap();
        assert_eq!(first.text, "[null] 8000 samples");
        assert_eq!(second.text, "[null] 8000 samples");

        drop(frame_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_window_overshoot_goes_into_one_call() {
        let mut worker = TranscriptionWorker::new(Box::new(NullEngine::new()), 8000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        // 3 x 3000 = 9000 samples: one call with the whole accumulated buffer
        for _ in 0..3 {
            frame_tx.send(chunk(3000)).unwrap();
        }
        let transcript = recv_timeout(&mut transcript_rx).await.unwrap();
        assert_eq!(transcript.text, "[null] 9000 samples");

        drop(frame_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_below_window_produces_nothing() {
        let mut worker = TranscriptionWorker::new(Box::new(NullEngine::new()), 8000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        frame_tx.send(chunk(7999)).unwrap();
        drop(frame_tx);
        handle.await.unwrap();

        assert!(transcript_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_drops_empty_transcripts() {
        let engine = NullEngine::with_script(vec!["", "   ", "stopp"]);
        let mut worker = TranscriptionWorker::new(Box::new(engine), 1000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        for _ in 0..3 {
            frame_tx.send(chunk(1000)).unwrap();
        }
        // The two empty results are swallowed; only "stopp" comes through
        let transcript = recv_timeout(&mut transcript_rx).await.unwrap();
        assert_eq!(transcript.text, "stopp");

        drop(frame_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_trims_transcript_text() {
        let engine = NullEngine::with_script(vec!["  gå frem \n"]);
        let mut worker = TranscriptionWorker::new(Box::new(engine), 1000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        frame_tx.send(chunk(1000)).unwrap();
        let transcript = recv_timeout(&mut transcript_rx).await.unwrap();
        assert_eq!(transcript.text, "gå frem");

        drop(frame_tx);
        handle.await.unwrap();
    }

    /// Fails on the first window, succeeds afterwards.
    struct FlakyEngine {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechEngine for FlakyEngine {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn initialize(&mut self, _config: toml::Value) -> Result<(), AsrError> {
            Ok(())
        }

        async fn transcribe(&self, audio: Vec<f32>) -> Result<String, AsrError> {
            if self.calls.fetch_add(1, Ordering::Relaxed) == 0 {
                Err(AsrError::ProcessingFailed("boom".to_string()))
            } else {
                Ok(format!("{} samples", audio.len()))
            }
        }

        async fn shutdown(&self) -> Result<(), AsrError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_worker_resets_buffer_after_engine_error() {
        let engine = FlakyEngine {
            calls: AtomicUsize::new(0),
        };
        let mut worker = TranscriptionWorker::new(Box::new(engine), 1000);
        let mut transcript_rx = worker.take_transcript_receiver().unwrap();
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let handle = worker.start(frame_rx);

        // First window errors; second window must start from an empty buffer
        frame_tx.send(chunk(1000)).unwrap();
        frame_tx.send(chunk(1000)).unwrap();

        let transcript = recv_timeout(&mut transcript_rx).await.unwrap();
        assert_eq!(transcript.text, "1000 samples");

        drop(frame_tx);
        handle.await.unwrap();
    }
}
