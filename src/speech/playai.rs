//! PlayAI (play.ht) text-to-speech provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use super::synthesis::SynthesisProvider;
use super::types::{AudioEncoding, SynthesisRequest};
use crate::error::ConciergeError;
use crate::util::http::{shared_client, status_to_error, trim_trailing_slash, within_deadline};
use crate::util::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "https://api.play.ht";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// PlayAI streaming TTS (`/api/v2/tts/stream`).
///
/// Authenticates with an API key plus the account user id, both carried
/// as headers on every request.
#[derive(Debug, Clone)]
pub struct PlayAiTtsProvider {
    api_key: String,
    user_id: String,
    base_url: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl PlayAiTtsProvider {
    pub fn new(api_key: String, user_id: String) -> Self {
        Self {
            api_key,
            user_id,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn new_with_base_url(
        api_key: String,
        user_id: String,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            user_id,
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
        if self.api_key.trim().is_empty() || self.user_id.trim().is_empty() {
            return Err(ConciergeError::Authentication(
                "Missing PlayAI API key or user id for speech synthesis".to_string(),
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
        Ok(())
    }

    fn headers(&self) -> Result<HeaderMap, ConciergeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("audio/mpeg"));
        headers.insert(
            "AUTHORIZATION",
            HeaderValue::from_str(&self.api_key).map_err(|e| {
                ConciergeError::InvalidArgument(format!("Invalid PlayAI API key: {e}"))
            })?,
        );
        headers.insert(
            "X-USER-ID",
            HeaderValue::from_str(&self.user_id).map_err(|e| {
                ConciergeError::InvalidArgument(format!("Invalid PlayAI user id: {e}"))
            })?,
        );
        Ok(headers)
    }

    async fn synthesize_once(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ConciergeError> {
        let payload = serde_json::json!({
            "text": request.text,
            "voice": request.voice.id,
            "output_format": match request.encoding {
                AudioEncoding::Linear16 => "wav",
                AudioEncoding::Mp3 => "mp3",
            },
        });

        let url = format!("{}/api/v2/tts/stream", trim_trailing_slash(&self.base_url));
        let headers = self.headers()?;

        within_deadline(self.timeout, async {
            let response = shared_client()
                .post(url)
                .headers(headers)
                .json(&payload)
                .send()
                .await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase();

            if content_type.starts_with("application/json") {
                let body = response.text().await.unwrap_or_default();
                return Err(ConciergeError::Provider {
                    provider: "playai".to_string(),
                    message: extract_error_message(&body)
                        .unwrap_or_else(|| "Expected audio payload, got JSON".to_string()),
                });
            }

            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Err(ConciergeError::InvalidState(
                    "Synthesis response contained empty audio payload".to_string(),
                ));
            }

            Ok(bytes.to_vec())
        })
        .await
    }
}

#[async_trait]
impl SynthesisProvider for PlayAiTtsProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ConciergeError> {
        self.validate_request(request)?;
        self.retry_policy
            .execute(|| self.synthesize_once(request))
            .await
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error_message")
        .or_else(|| parsed.get("error").and_then(|e| e.get("message")))
        .and_then(|message| message.as_str())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            extract_error_message(r#"{"error_message":"bad voice"}"#).as_deref(),
            Some("bad voice")
        );
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"nope"}}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(extract_error_message("not-json"), None);
    }
}
