//! Audio capture/playback seams.
//!
//! Default builds stay headless: capture comes from `TerminalInput` and
//! playback goes to a `FileSink`. Real microphone and speaker support is
//! behind the `audio-io` feature.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::types::RecordedAudio;
use crate::error::Result;

/// Captures one utterance worth of audio.
#[async_trait]
pub trait AudioSource: Send + Sync {
    async fn record_utterance(&self) -> Result<RecordedAudio>;
}

/// Plays back synthesized audio.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, audio: &[u8], mime_type: &str) -> Result<()>;
}

/// Sink that writes audio to a directory and logs the path.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A sink writing into the OS temp directory.
    pub fn temp() -> Self {
        Self::new(std::env::temp_dir().join("concierge-audio"))
    }
}

#[async_trait]
impl AudioSink for FileSink {
    async fn play(&self, audio: &[u8], mime_type: &str) -> Result<()> {
        let extension = match mime_type {
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/mpeg" | "audio/mp3" => "mp3",
            _ => "bin",
        };
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("reply-{}.{extension}", Uuid::new_v4()));
        tokio::fs::write(&path, audio).await?;
        info!(path = %path.display(), bytes = audio.len(), "Wrote synthesized reply");
        Ok(())
    }
}

#[cfg(feature = "audio-io")]
pub use self::io::{Microphone, Speaker};

#[cfg(feature = "audio-io")]
mod io {
    use std::io::Cursor;
    use std::time::Duration;

    use async_trait::async_trait;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use tracing::info;

    use super::{AudioSink, AudioSource};
    use crate::error::{ConciergeError, Result};
    use crate::speech::types::RecordedAudio;

    /// Fixed-window microphone capture producing a mono WAV utterance.
    #[derive(Debug, Clone)]
    pub struct Microphone {
        window: Duration,
    }

    impl Microphone {
        pub fn new(window: Duration) -> Self {
            Self { window }
        }
    }

    impl Default for Microphone {
        fn default() -> Self {
            Self::new(Duration::from_secs(5))
        }
    }

    #[async_trait]
    impl AudioSource for Microphone {
        async fn record_utterance(&self) -> Result<RecordedAudio> {
            let window = self.window;
            let bytes = tokio::task::spawn_blocking(move || capture_wav(window))
                .await
                .map_err(|e| ConciergeError::Audio(format!("Capture task failed: {e}")))??;

            Ok(RecordedAudio {
                bytes,
                mime_type: "audio/wav".to_string(),
            })
        }
    }

    fn capture_wav(window: Duration) -> Result<Vec<u8>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| ConciergeError::Audio("No input device available".to_string()))?;

        let config: cpal::StreamConfig = device
            .default_input_config()
            .map_err(|e| ConciergeError::Audio(format!("Failed to get input config: {e}")))?
            .into();

        let sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;
        let (tx, rx) = std::sync::mpsc::channel::<Vec<f32>>();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Average all channels to mono
                    let samples: Vec<f32> = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };
                    let _ = tx.send(samples);
                },
                |err| tracing::error!("Audio input stream error: {err}"),
                None,
            )
            .map_err(|e| ConciergeError::Audio(format!("Failed to build input stream: {e}")))?;

        stream
            .play()
            .map_err(|e| ConciergeError::Audio(format!("Failed to start input stream: {e}")))?;

        info!(seconds = window.as_secs(), "Recording utterance");
        std::thread::sleep(window);
        drop(stream);

        let mut samples = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            samples.extend(chunk);
        }

        if samples.is_empty() {
            return Err(ConciergeError::Audio(
                "Capture produced no samples".to_string(),
            ));
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| ConciergeError::Audio(format!("Failed to create WAV: {e}")))?;
            for sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(value)
                    .map_err(|e| ConciergeError::Audio(format!("Failed to write WAV: {e}")))?;
            }
            writer
                .finalize()
                .map_err(|e| ConciergeError::Audio(format!("Failed to finalize WAV: {e}")))?;
        }

        Ok(cursor.into_inner())
    }

    /// Plays 16-bit PCM WAV payloads through the default output device.
    #[derive(Debug, Clone, Default)]
    pub struct Speaker;

    impl Speaker {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl AudioSink for Speaker {
        async fn play(&self, audio: &[u8], mime_type: &str) -> Result<()> {
            if !matches!(mime_type, "audio/wav" | "audio/x-wav" | "audio/wave") {
                return Err(ConciergeError::Audio(format!(
                    "Speaker sink only plays WAV, got {mime_type}"
                )));
            }
            let audio = audio.to_vec();
            tokio::task::spawn_blocking(move || play_wav(&audio))
                .await
                .map_err(|e| ConciergeError::Audio(format!("Playback task failed: {e}")))?
        }
    }

    fn play_wav(audio: &[u8]) -> Result<()> {
        let reader = hound::WavReader::new(Cursor::new(audio))
            .map_err(|e| ConciergeError::Audio(format!("Invalid WAV payload: {e}")))?;
        let spec = reader.spec();
        let samples: Vec<f32> = reader
            .into_samples::<i16>()
            .filter_map(|s| s.ok())
            .map(|s| s as f32 / i16::MAX as f32)
            .collect();

        let duration = Duration::from_secs_f64(
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64),
        );

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ConciergeError::Audio("No output device available".to_string()))?;

        let config = cpal::StreamConfig {
            channels: spec.channels,
            sample_rate: cpal::SampleRate(spec.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut queued = samples.into_iter();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for slot in data.iter_mut() {
                        *slot = queued.next().unwrap_or(0.0);
                    }
                },
                |err| tracing::error!("Audio output stream error: {err}"),
                None,
            )
            .map_err(|e| ConciergeError::Audio(format!("Failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| ConciergeError::Audio(format!("Failed to start output stream: {e}")))?;

        std::thread::sleep(duration + Duration::from_millis(200));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_sink_writes_payload() {
        let dir = std::env::temp_dir().join(format!("concierge-test-{}", Uuid::new_v4()));
        let sink = FileSink::new(&dir);

        sink.play(b"fake-audio", "audio/mpeg").await.unwrap();

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let entry = entries.next_entry().await.unwrap().expect("one file");
        assert_eq!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("mp3")
        );
        let written = tokio::fs::read(entry.path()).await.unwrap();
        assert_eq!(written, b"fake-audio");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
