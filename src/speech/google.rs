//! Google Cloud speech providers (`speech:recognize` + `text:synthesize`).

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use super::synthesis::SynthesisProvider;
use super::transcription::TranscriptionProvider;
use super::types::{normalize_mime_type, AudioEncoding, SynthesisRequest, TranscriptionResult};
use crate::error::ConciergeError;
use crate::util::http::{shared_client, status_to_error, trim_trailing_slash, within_deadline};
use crate::util::retry::RetryPolicy;

const DEFAULT_STT_BASE_URL: &str = "https://speech.googleapis.com";
const DEFAULT_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Google Cloud Speech-to-Text provider (`/v1/speech:recognize`).
#[derive(Debug, Clone)]
pub struct GoogleSttProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl GoogleSttProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_STT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
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
    ) -> Result<&'static str, ConciergeError> {
        if self.api_key.trim().is_empty() {
            return Err(ConciergeError::Authentication(
                "Missing Google API key for speech recognition".to_string(),
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
        recognition_encoding(normalized).ok_or_else(|| {
            ConciergeError::InvalidArgument(format!(
                "Unsupported recognition MIME type: {normalized}"
            ))
        })
    }

    async fn recognize_once(
        &self,
        audio: &[u8],
        encoding: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, ConciergeError> {
        let language = language.unwrap_or(DEFAULT_LANGUAGE);
        let mut config = serde_json::json!({ "languageCode": language });
        // WAV and FLAC headers carry encoding and sample rate; only opus
        // containers need them spelled out.
        if !encoding.is_empty() {
            config["encoding"] = serde_json::json!(encoding);
            config["sampleRateHertz"] = serde_json::json!(48_000);
        }

        let payload = serde_json::json!({
            "config": config,
            "audio": { "content": BASE64.encode(audio) },
        });

        let url = format!(
            "{}/v1/speech:recognize?key={}",
            trim_trailing_slash(&self.base_url),
            self.api_key,
        );

        within_deadline(self.timeout, async {
            let response = shared_client().post(&url).json(&payload).send().await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body));
            }

            let parsed: RecognizeResponse = serde_json::from_str(&response.text().await?)?;
            let text = parsed.transcript();
            if text.trim().is_empty() {
                return Err(ConciergeError::InvalidState(
                    "Recognition response contained no transcript".to_string(),
                ));
            }

            Ok(TranscriptionResult {
                text,
                language: Some(language.to_string()),
                duration_seconds: None,
            })
        })
        .await
    }
}

#[async_trait]
impl TranscriptionProvider for GoogleSttProvider {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, ConciergeError> {
        let encoding = self.validate_inputs(audio, mime_type)?;
        self.retry_policy
            .execute(|| self.recognize_once(audio, encoding, language))
            .await
    }
}

/// Recognition encoding for a MIME type; empty means "let the container
/// header decide"; `None` means unsupported.
fn recognition_encoding(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some(""),
        "audio/flac" | "audio/x-flac" => Some(""),
        "audio/webm" => Some("WEBM_OPUS"),
        "audio/ogg" => Some("OGG_OPUS"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    results: Option<Vec<RecognizeResult>>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    alternatives: Option<Vec<RecognizeAlternative>>,
}

#[derive(Debug, Deserialize)]
struct RecognizeAlternative {
    transcript: Option<String>,
}

impl RecognizeResponse {
    /// Top alternative of every result, concatenated in order.
    fn transcript(self) -> String {
        self.results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|result| result.alternatives?.into_iter().next()?.transcript)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Google Cloud Text-to-Speech provider (`/v1/text:synthesize`).
#[derive(Debug, Clone)]
pub struct GoogleTtsProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl GoogleTtsProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_TTS_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn new_with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn validate_request(&self, request: &SynthesisRequest) -> Result<(), ConciergeError> {
        if self.api_key.trim().is_empty() {
            return Err(ConciergeError::Authentication(
                "Missing Google API key for speech synthesis".to_string(),
            ));
        }
        if request.text.trim().is_empty() {
            return Err(ConciergeError::InvalidArgument(
                "Synthesis text cannot be empty".to_string(),
            ));
        }
        if request.voice.id.trim().is_empty() {
            return Err(ConciergeError::InvalidArgument(
                "Voice id cannot be empty".to_string(),
            ));
        }
        if let Some(rate) = request.speaking_rate {
            if !rate.is_finite() || !(0.25..=4.0).contains(&rate) {
                return Err(ConciergeError::InvalidArgument(
                    "Speaking rate must be between 0.25 and 4.0".to_string(),
                ));
            }
        }
        Ok(())
    }

    async fn synthesize_once(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ConciergeError> {
        let language = request
            .voice
            .language_code
            .as_deref()
            .unwrap_or(DEFAULT_LANGUAGE);

        let mut audio_config = serde_json::json!({
            "audioEncoding": match request.encoding {
                AudioEncoding::Linear16 => "LINEAR16",
                AudioEncoding::Mp3 => "MP3",
            },
        });
        if let Some(rate) = request.speaking_rate {
            audio_config["speakingRate"] = serde_json::json!(rate);
        }

        let payload = serde_json::json!({
            "input": { "text": request.text },
            "voice": { "languageCode": language, "name": request.voice.id },
            "audioConfig": audio_config,
        });

        let url = format!(
            "{}/v1/text:synthesize?key={}",
            trim_trailing_slash(&self.base_url),
            self.api_key,
        );

        within_deadline(self.timeout, async {
            let response = shared_client().post(&url).json(&payload).send().await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body));
            }

            let parsed: SynthesizeResponse = serde_json::from_str(&response.text().await?)?;
            let encoded = parsed.audio_content.unwrap_or_default();
            if encoded.is_empty() {
                return Err(ConciergeError::InvalidState(
                    "Synthesis response missing audioContent".to_string(),
                ));
            }

            BASE64.decode(encoded.as_bytes()).map_err(|e| {
                ConciergeError::InvalidState(format!("Invalid base64 audioContent: {e}"))
            })
        })
        .await
    }
}

#[async_trait]
impl SynthesisProvider for GoogleTtsProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ConciergeError> {
        self.validate_request(request)?;
        self.retry_policy
            .execute(|| self.synthesize_once(request))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: Option<String>,
}
