use cpal::traits::DeviceTrait;
use cpal::{Device, SampleRate, Stream, StreamConfig};
use stembot_core::{AudioChunk, AudioError};
use tokio::sync::mpsc;

/// Bridges the audio driver's callback thread into the transcription
/// worker's frame channel. The callback copies the delivered frame and
/// sends it without blocking; it must never do more than that, since it
/// runs on the driver's real-time thread.
///
/// The frame channel is unbounded on purpose: the source system has no
/// backpressure, so a slow transcription step grows the queue rather than
/// dropping audio.
pub struct CaptureNode {
    _stream: Stream,
}

impl CaptureNode {
    pub fn new(
        device: &Device,
        frame_tx: mpsc::UnboundedSender<AudioChunk>,
        sample_rate: u32,
        channels: u16,
        buffer_size: u32,
    ) -> Result<Self, AudioError> {
        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Fixed(buffer_size),
        };

        let err_callback = |err: cpal::StreamError| {
            tracing::error!("capture stream error: {}", err);
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let chunk = AudioChunk {
                        samples: data.to_vec(),
                        sample_rate,
                        channels,
                    };
                    let _ = frame_tx.send(chunk);
                },
                err_callback,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        Ok(Self { _stream: stream })
    }
}
