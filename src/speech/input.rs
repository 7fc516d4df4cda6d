//! Speech input adapter: strategies and the swappable client holder.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use super::device::AudioSource;
use super::transcription::TranscriptionProvider;
use crate::error::Result;

/// Capability of turning one user utterance into text.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn name(&self) -> &str;

    /// Capture one utterance and return its transcription.
    async fn listen_and_transcribe(&self) -> Result<String>;
}

/// Holder for the active speech-input strategy.
///
/// Swapping mutates only this reference; the strategies themselves are
/// never touched.
pub struct SttClient {
    strategy: Arc<dyn SpeechInput>,
}

impl SttClient {
    pub fn new(strategy: Arc<dyn SpeechInput>) -> Self {
        Self { strategy }
    }

    pub fn set_strategy(&mut self, strategy: Arc<dyn SpeechInput>) {
        self.strategy = strategy;
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub async fn listen_and_transcribe(&self) -> Result<String> {
        self.strategy.listen_and_transcribe().await
    }
}

/// Keyboard fallback: reads one line from stdin.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpeechInput for TerminalInput {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn listen_and_transcribe(&self) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            // stdin closed; end the conversation instead of spinning.
            return Ok("exit".to_string());
        }
        Ok(line.trim_end().to_string())
    }
}

/// Microphone capture piped through a transcription provider strategy.
pub struct VoiceInput {
    name: String,
    source: Arc<dyn AudioSource>,
    provider: Arc<dyn TranscriptionProvider>,
    language: Option<String>,
}

impl VoiceInput {
    pub fn new(
        name: impl Into<String>,
        source: Arc<dyn AudioSource>,
        provider: Arc<dyn TranscriptionProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            provider,
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[async_trait]
impl SpeechInput for VoiceInput {
    fn name(&self) -> &str {
        &self.name
    }

    async fn listen_and_transcribe(&self) -> Result<String> {
        info!(strategy = %self.name, "Listening...");
        let recording = self.source.record_utterance().await?;

        let result = self
            .provider
            .transcribe(
                &recording.bytes,
                &recording.mime_type,
                self.language.as_deref(),
            )
            .await?;

        println!("You: {}", result.text);
        Ok(result.text)
    }
}
