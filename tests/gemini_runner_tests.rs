use std::sync::Arc;

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use concierge::agent::{AgentRunner, GeminiAgentRunner, TurnEvent};
use concierge::error::ConciergeError;
use concierge::session::{ConversationState, InMemorySessionService, SessionRef, SessionService};

async fn fixture(server: &MockServer) -> (GeminiAgentRunner, SessionRef) {
    let sessions = Arc::new(InMemorySessionService::new());
    let session = sessions
        .create_session("Hotel Customer Support", "user-1", ConversationState::initial())
        .await
        .unwrap();
    let session_ref = SessionRef {
        app_name: "Hotel Customer Support".to_string(),
        user_id: "user-1".to_string(),
        session_id: session.id,
    };

    let runner = GeminiAgentRunner::new("test-key".to_string(), sessions)
        .with_base_url(server.uri());
    (runner, session_ref)
}

async fn collect(runner: &GeminiAgentRunner, session: &SessionRef, message: &str) -> Vec<concierge::error::Result<TurnEvent>> {
    runner
        .run_turn(session, message)
        .await
        .expect("turn should start")
        .collect()
        .await
}

#[tokio::test]
async fn turn_yields_progress_then_final_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("Book room_101"))
        .and(body_string_contains("rooms_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Room 101 booked."}]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (runner, session_ref) = fixture(&server).await;
    let events = collect(&runner, &session_ref, "Book room_101").await;

    assert_eq!(events.len(), 2);
    let first = events[0].as_ref().unwrap();
    assert!(!first.is_final);

    let last = events[1].as_ref().unwrap();
    assert!(last.is_final);
    assert_eq!(last.first_part_text(), Some("Room 101 booked."));
    assert_eq!(last.author, "hotel_agent");
}

#[tokio::test]
async fn empty_candidates_yield_textless_final_event() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let (runner, session_ref) = fixture(&server).await;
    let events = collect(&runner, &session_ref, "hello").await;

    let last = events.last().unwrap().as_ref().unwrap();
    assert!(last.is_final);
    assert_eq!(last.first_part_text(), None);
}

#[tokio::test]
async fn api_error_surfaces_as_stream_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let (runner, session_ref) = fixture(&server).await;
    let events = collect(&runner, &session_ref, "hello").await;

    assert!(events.last().unwrap().is_err());
}

#[tokio::test]
async fn empty_utterance_is_rejected_up_front() {
    let server = MockServer::start().await;
    let (runner, session_ref) = fixture(&server).await;

    let err = runner
        .run_turn(&session_ref, "   ")
        .await
        .map(|_| ())
        .expect_err("blank utterance should fail");

    assert!(matches!(err, ConciergeError::InvalidArgument(_)));
}

#[tokio::test]
async fn unknown_session_fails_before_any_request() {
    let server = MockServer::start().await;
    let (runner, mut session_ref) = fixture(&server).await;
    session_ref.session_id = "missing".to_string();

    let err = runner
        .run_turn(&session_ref, "hello")
        .await
        .map(|_| ())
        .expect_err("missing session should fail");

    assert!(matches!(err, ConciergeError::SessionNotFound { .. }));
}
