//! Audio transcription trait.

use async_trait::async_trait;

use super::types::TranscriptionResult;
use crate::error::ConciergeError;

/// Trait for speech-to-text providers.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe audio data.
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, ConciergeError>;
}
