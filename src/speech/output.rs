//! Speech output adapter: strategies and the swappable client holder.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::device::AudioSink;
use super::synthesis::SynthesisProvider;
use super::types::{AudioEncoding, SynthesisRequest, Voice};
use crate::error::Result;

/// Capability of speaking one reply. Fire-and-forget: the loop consumes
/// no return value beyond success.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    fn name(&self) -> &str;

    async fn speak(&self, text: &str) -> Result<()>;
}

/// Holder for the active speech-output strategy.
pub struct TtsClient {
    strategy: Arc<dyn SpeechOutput>,
}

impl TtsClient {
    pub fn new(strategy: Arc<dyn SpeechOutput>) -> Self {
        Self { strategy }
    }

    pub fn set_strategy(&mut self, strategy: Arc<dyn SpeechOutput>) {
        self.strategy = strategy;
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub async fn speak(&self, text: &str) -> Result<()> {
        self.strategy.speak(text).await
    }
}

/// Silent default strategy; the reply is already printed by the loop.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpeechOutput for ConsoleOutput {
    fn name(&self) -> &str {
        "console"
    }

    async fn speak(&self, text: &str) -> Result<()> {
        debug!(chars = text.len(), "console output strategy; nothing to play");
        Ok(())
    }
}

/// Cloud synthesis piped into an audio sink.
pub struct VoiceOutput {
    name: String,
    provider: Arc<dyn SynthesisProvider>,
    sink: Arc<dyn AudioSink>,
    voice: Voice,
    encoding: AudioEncoding,
}

impl VoiceOutput {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn SynthesisProvider>,
        sink: Arc<dyn AudioSink>,
        voice: Voice,
        encoding: AudioEncoding,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            sink,
            voice,
            encoding,
        }
    }
}

#[async_trait]
impl SpeechOutput for VoiceOutput {
    fn name(&self) -> &str {
        &self.name
    }

    async fn speak(&self, text: &str) -> Result<()> {
        let request = SynthesisRequest::new(text, self.voice.clone(), self.encoding);
        let audio = self.provider.synthesize(&request).await?;
        info!(strategy = %self.name, bytes = audio.len(), "Speaking reply");
        self.sink.play(&audio, self.encoding.mime_type()).await
    }
}
