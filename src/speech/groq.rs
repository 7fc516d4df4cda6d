//! Groq Whisper transcription provider (OpenAI-compatible endpoint).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use uuid::Uuid;

use super::transcription::TranscriptionProvider;
use super::types::{normalize_mime_type, TranscriptionResult};
use crate::error::ConciergeError;
use crate::util::http::{bearer_headers, shared_client, status_to_error, trim_trailing_slash, within_deadline};
use crate::util::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "whisper-large-v3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Groq-hosted Whisper transcription (`/audio/transcriptions`).
#[derive(Debug, Clone)]
pub struct GroqWhisperProvider {
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl GroqWhisperProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn validate_inputs(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<String, ConciergeError> {
        if self.api_key.trim().is_empty() {
            return Err(ConciergeError::Authentication(
                "Missing Groq API key for audio transcription".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConciergeError::InvalidArgument(
                "Transcription model cannot be empty".to_string(),
            ));
        }
        if audio.is_empty() {
            return Err(ConciergeError::InvalidArgument(
                "Audio payload cannot be empty".to_string(),
            ));
        }

        let normalized = normalize_mime_type(mime_type).ok_or_else(|| {
            ConciergeError::InvalidArgument("MIME type cannot be empty".to_string())
        })?;
        if upload_extension(normalized).is_none() {
            return Err(ConciergeError::InvalidArgument(format!(
                "Unsupported transcription MIME type: {normalized}"
            )));
        }

        if let Some(lang) = language {
            if lang.trim().is_empty() {
                return Err(ConciergeError::InvalidArgument(
                    "Language hint cannot be empty".to_string(),
                ));
            }
        }

        Ok(normalized.to_string())
    }

    async fn transcribe_once(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, ConciergeError> {
        let extension = upload_extension(mime_type).ok_or_else(|| {
            ConciergeError::InvalidArgument(format!(
                "Unsupported transcription MIME type: {mime_type}"
            ))
        })?;

        let mut form = TranscriptionForm::new();
        form.text("model", &self.model);
        if let Some(lang) = language {
            form.text("language", lang.trim());
        }
        form.file("file", &format!("audio.{extension}"), mime_type, audio);

        let mut headers = bearer_headers(&self.api_key);
        headers.insert(
            CONTENT_TYPE,
            reqwest::header::HeaderValue::from_str(&form.content_type()).map_err(|e| {
                ConciergeError::InvalidArgument(format!(
                    "Failed to build multipart content-type: {e}"
                ))
            })?,
        );

        let url = format!(
            "{}/audio/transcriptions",
            trim_trailing_slash(&self.base_url)
        );

        within_deadline(self.timeout, async {
            let response = shared_client()
                .post(url)
                .headers(headers)
                .body(form.finish())
                .send()
                .await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body));
            }

            let parsed: GroqTranscriptionResponse =
                serde_json::from_str(&response.text().await?)?;
            if parsed.text.trim().is_empty() {
                return Err(ConciergeError::InvalidState(
                    "Transcription response missing text".to_string(),
                ));
            }

            Ok(TranscriptionResult {
                text: parsed.text,
                language: parsed.language,
                duration_seconds: parsed.duration,
            })
        })
        .await
    }
}

#[async_trait]
impl TranscriptionProvider for GroqWhisperProvider {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, ConciergeError> {
        let normalized_mime = self.validate_inputs(audio, mime_type, language)?;
        self.retry_policy
            .execute(|| self.transcribe_once(audio, &normalized_mime, language))
            .await
    }
}

/// Hand-assembled `multipart/form-data` body. The endpoint needs only a
/// couple of text fields plus the audio file, so reqwest's multipart
/// feature stays off.
struct TranscriptionForm {
    boundary: String,
    body: Vec<u8>,
}

impl TranscriptionForm {
    fn new() -> Self {
        Self {
            boundary: format!("concierge-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn text(&mut self, name: &str, value: &str) {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
        ));
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
    }

    fn file(&mut self, name: &str, filename: &str, mime_type: &str, payload: &[u8]) {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
             Content-Type: {mime_type}\r\n\r\n"
        ));
        self.body.extend_from_slice(payload);
        self.body.extend_from_slice(b"\r\n");
    }

    fn open_part(&mut self, headers: &str) {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(headers.as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

/// Upload filename extension for a MIME type; `None` means the format
/// is not accepted by the transcription endpoint.
fn upload_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "audio/mpeg" | "audio/mp3" | "audio/mpga" => Some("mp3"),
        "audio/mp4" | "audio/x-m4a" => Some("m4a"),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/webm" => Some("webm"),
        "audio/ogg" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct GroqTranscriptionResponse {
    text: String,
    language: Option<String>,
    duration: Option<f64>,
}
