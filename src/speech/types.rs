//! Shared audio types.

use serde::{Deserialize, Serialize};

/// Result of transcribing one utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionResult {
    pub text: String,
    pub language: Option<String>,
    pub duration_seconds: Option<f64>,
}

/// Audio encoding requested from a synthesis provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    /// 16-bit PCM in a WAV container.
    Linear16,
    Mp3,
}

impl AudioEncoding {
    /// MIME type of the synthesized payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Linear16 => "audio/wav",
            Self::Mp3 => "audio/mpeg",
        }
    }
}

/// A provider voice selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub language_code: Option<String>,
}

impl Voice {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            language_code: None,
        }
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }
}

/// Request for speech synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: Voice,
    pub encoding: AudioEncoding,
    pub speaking_rate: Option<f64>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice: Voice, encoding: AudioEncoding) -> Self {
        Self {
            text: text.into(),
            voice,
            encoding,
            speaking_rate: None,
        }
    }
}

/// One captured utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// MIME essence without parameters ("audio/wav; rate=16000" -> "audio/wav"),
/// or `None` for a blank value.
pub(crate) fn normalize_mime_type(mime_type: &str) -> Option<&str> {
    let essence = mime_type.split(';').next()?.trim();
    (!essence.is_empty()).then_some(essence)
}
