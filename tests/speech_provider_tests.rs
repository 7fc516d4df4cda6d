use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concierge::error::ConciergeError;
use concierge::speech::{
    AudioEncoding, GoogleSttProvider, GoogleTtsProvider, GroqWhisperProvider, PlayAiTtsProvider,
    SynthesisProvider, SynthesisRequest, TranscriptionProvider, Voice,
};
use concierge::util::retry::RetryPolicy;

fn test_retry_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(1),
        multiplier: 1.0,
    }
}

fn synthesis_request() -> SynthesisRequest {
    SynthesisRequest::new(
        "Your booking is confirmed.",
        Voice::new("en-US-Neural2-C").with_language("en-US"),
        AudioEncoding::Linear16,
    )
}

// --- Google STT ---

#[tokio::test]
async fn google_stt_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains(&BASE64.encode(b"RIFFfakewav")))
        .and(body_string_contains("\"languageCode\":\"en-US\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"alternatives": [{"transcript": "book a", "confidence": 0.92}]},
                {"alternatives": [{"transcript": "single room"}]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleSttProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let result = provider
        .transcribe(b"RIFFfakewav", "audio/wav", Some("en-US"))
        .await
        .expect("transcription should succeed");

    assert_eq!(result.text, "book a single room");
    assert_eq!(result.language.as_deref(), Some("en-US"));
}

#[tokio::test]
async fn google_stt_spells_out_opus_encoding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .and(body_string_contains("\"encoding\":\"WEBM_OPUS\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"alternatives": [{"transcript": "hello"}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleSttProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let result = provider
        .transcribe(b"webm-bytes", "audio/webm", None)
        .await
        .unwrap();

    assert_eq!(result.text, "hello");
}

#[tokio::test]
async fn google_stt_rejects_unsupported_mime() {
    let provider = GoogleSttProvider::new("test-key".to_string());

    let err = provider
        .transcribe(b"audio", "text/plain", None)
        .await
        .expect_err("unsupported mime should fail");

    assert!(
        matches!(err, ConciergeError::InvalidArgument(message) if message.contains("Unsupported recognition MIME type"))
    );
}

#[tokio::test]
async fn google_stt_empty_transcript_is_invalid_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let provider = GoogleSttProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let err = provider
        .transcribe(b"RIFFfakewav", "audio/wav", None)
        .await
        .expect_err("empty transcript should fail");

    assert!(matches!(err, ConciergeError::InvalidState(_)));
}

#[tokio::test]
async fn google_stt_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/speech:recognize"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(3)
        .mount(&server)
        .await;

    let provider = GoogleSttProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(3));

    let err = provider
        .transcribe(b"RIFFfakewav", "audio/wav", None)
        .await
        .expect_err("server error should bubble up after retries");

    assert!(matches!(err, ConciergeError::Api { status: 500, .. }));
}

// --- Google TTS ---

#[tokio::test]
async fn google_tts_happy_path_decodes_audio_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("\"audioEncoding\":\"LINEAR16\""))
        .and(body_string_contains("\"name\":\"en-US-Neural2-C\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "audioContent": BASE64.encode([1_u8, 2, 3, 4])
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleTtsProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let audio = provider
        .synthesize(&synthesis_request())
        .await
        .expect("synthesis should succeed");

    assert_eq!(audio, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn google_tts_missing_audio_content_is_invalid_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let provider = GoogleTtsProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let err = provider
        .synthesize(&synthesis_request())
        .await
        .expect_err("missing audioContent should fail");

    assert!(
        matches!(err, ConciergeError::InvalidState(message) if message.contains("audioContent"))
    );
}

#[tokio::test]
async fn google_tts_rejects_blank_text() {
    let provider = GoogleTtsProvider::new("test-key".to_string());

    let mut request = synthesis_request();
    request.text = "   ".to_string();

    let err = provider
        .synthesize(&request)
        .await
        .expect_err("blank text should fail");

    assert!(matches!(err, ConciergeError::InvalidArgument(_)));
}

#[tokio::test]
async fn google_tts_rejects_out_of_range_speaking_rate() {
    let provider = GoogleTtsProvider::new("test-key".to_string());

    let mut request = synthesis_request();
    request.speaking_rate = Some(10.0);

    let err = provider
        .synthesize(&request)
        .await
        .expect_err("invalid rate should fail");

    assert!(
        matches!(err, ConciergeError::InvalidArgument(message) if message.contains("between 0.25 and 4.0"))
    );
}

#[tokio::test]
async fn google_tts_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(80))
                .set_body_json(json!({"audioContent": BASE64.encode([1_u8])})),
        )
        .mount(&server)
        .await;

    let provider = GoogleTtsProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_timeout(Duration::from_millis(10))
        .with_retry_policy(test_retry_policy(1));

    let err = provider
        .synthesize(&synthesis_request())
        .await
        .expect_err("request should time out");

    assert!(matches!(err, ConciergeError::Timeout(ms) if ms == 10));
}

// --- Groq Whisper ---

#[tokio::test]
async fn groq_whisper_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("name=\"model\""))
        .and(body_string_contains("whisper-large-v3"))
        .and(body_string_contains("name=\"language\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "book a single room",
            "language": "en",
            "duration": 2.4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GroqWhisperProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let result = provider
        .transcribe(b"RIFFfakewav", "audio/wav", Some("en"))
        .await
        .expect("transcription should succeed");

    assert_eq!(result.text, "book a single room");
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(result.duration_seconds, Some(2.4));
}

#[tokio::test]
async fn groq_whisper_handles_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_bytes(b"{not-json".to_vec()),
        )
        .mount(&server)
        .await;

    let provider = GroqWhisperProvider::new_with_base_url("test-key".to_string(), server.uri())
        .with_retry_policy(test_retry_policy(1));

    let err = provider
        .transcribe(b"fake", "audio/mpeg", None)
        .await
        .expect_err("malformed json should fail");

    assert!(matches!(err, ConciergeError::Serialization(_)));
}

#[tokio::test]
async fn groq_whisper_rejects_empty_audio() {
    let provider = GroqWhisperProvider::new("test-key".to_string());

    let err = provider
        .transcribe(b"", "audio/wav", None)
        .await
        .expect_err("empty audio should fail");

    assert!(
        matches!(err, ConciergeError::InvalidArgument(message) if message.contains("Audio payload"))
    );
}

// --- PlayAI TTS ---

#[tokio::test]
async fn playai_happy_path_sends_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/tts/stream"))
        .and(header("AUTHORIZATION", "test-key"))
        .and(header("X-USER-ID", "user-42"))
        .and(body_string_contains("\"output_format\":\"wav\""))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/wav")
                .set_body_bytes(vec![9_u8, 8, 7]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = PlayAiTtsProvider::new_with_base_url(
        "test-key".to_string(),
        "user-42".to_string(),
        server.uri(),
    )
    .with_retry_policy(test_retry_policy(1));

    let mut request = synthesis_request();
    request.voice = Voice::new("jennifer");

    let audio = provider
        .synthesize(&request)
        .await
        .expect("synthesis should succeed");

    assert_eq!(audio, vec![9, 8, 7]);
}

#[tokio::test]
async fn playai_json_error_payload_maps_to_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/tts/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_json(json!({"error_message": "unknown voice"})),
        )
        .mount(&server)
        .await;

    let provider = PlayAiTtsProvider::new_with_base_url(
        "test-key".to_string(),
        "user-42".to_string(),
        server.uri(),
    )
    .with_retry_policy(test_retry_policy(1));

    let err = provider
        .synthesize(&synthesis_request())
        .await
        .expect_err("json payload should fail");

    assert!(
        matches!(err, ConciergeError::Provider { provider, message } if provider == "playai" && message.contains("unknown voice"))
    );
}

#[tokio::test]
async fn playai_missing_credentials_is_authentication_error() {
    let provider = PlayAiTtsProvider::new("".to_string(), "user-42".to_string());

    let err = provider
        .synthesize(&synthesis_request())
        .await
        .expect_err("missing key should fail");

    assert!(matches!(err, ConciergeError::Authentication(_)));
}
