//! Gemini-backed agent runner (`generateContent` over HTTP).

use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ConciergeConfig;
use crate::error::{ConciergeError, Result};
use crate::session::{render_state, SessionRef, SessionService};
use crate::util::http::{shared_client, status_to_error, trim_trailing_slash, within_deadline};

use super::{AgentRunner, EventContent, EventPart, TurnEvent, TurnEventStream};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are the customer support agent of a hotel. \
Help the guest with room bookings, pricing, availability, and open issues. \
Answer briefly and in the guest's language. \
The current session state follows; treat it as the source of truth.";

/// Agent runner backed by the Gemini `generateContent` API.
///
/// Reads the session state through the session service to ground each
/// turn; emits a progress event followed by one final-response event.
#[derive(Clone)]
pub struct GeminiAgentRunner {
    model: String,
    api_key: String,
    base_url: String,
    timeout: Duration,
    sessions: Arc<dyn SessionService>,
}

impl GeminiAgentRunner {
    pub fn new(api_key: String, sessions: Arc<dyn SessionService>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            sessions,
        }
    }

    /// Build a runner from config, honoring the `gemini` base-url override.
    pub fn from_config(
        config: &ConciergeConfig,
        sessions: Arc<dyn SessionService>,
    ) -> Result<Self> {
        let api_key = config.get_api_key("google").ok_or_else(|| {
            ConciergeError::Configuration(
                "Missing Google API key for the agent runtime (set GOOGLE_API_KEY)".to_string(),
            )
        })?;
        let mut runner = Self::new(api_key, sessions);
        if let Some(url) = config.get_base_url("gemini") {
            runner.base_url = url;
        }
        Ok(runner)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_request_body(&self, state_listing: &str, message: &str) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": {
                "parts": [{"text": format!("{SYSTEM_PROMPT}\n\n{state_listing}")}]
            },
            "contents": [{
                "role": "user",
                "parts": [{"text": message}],
            }],
        })
    }

    async fn generate(&self, body: serde_json::Value) -> Result<Option<String>> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            trim_trailing_slash(&self.base_url),
            self.model,
            self.api_key,
        );

        within_deadline(self.timeout, async {
            let response = shared_client().post(&url).json(&body).send().await?;

            let status = response.status().as_u16();
            if status != 200 {
                let body = response.text().await.unwrap_or_default();
                return Err(status_to_error(status, &body));
            }

            let parsed: GenerateContentResponse = response.json().await?;
            Ok(parsed.reply_text())
        })
        .await
    }
}

#[async_trait]
impl AgentRunner for GeminiAgentRunner {
    async fn run_turn(&self, session: &SessionRef, message: &str) -> Result<TurnEventStream> {
        if message.trim().is_empty() {
            return Err(ConciergeError::InvalidArgument(
                "Utterance cannot be empty".to_string(),
            ));
        }

        let snapshot = self.sessions.get_session(session).await?;
        let body = self.build_request_body(&render_state(&snapshot.state), message);

        let runner = self.clone();
        let stream = try_stream! {
            yield TurnEvent::progress("hotel_agent");

            let reply = runner.generate(body).await?;
            debug!(has_reply = reply.is_some(), "gemini turn complete");

            match reply {
                Some(text) => yield TurnEvent::final_reply("hotel_agent", text),
                // Final event with no content; the executor reports the gap.
                None => yield TurnEvent {
                    id: uuid::Uuid::new_v4(),
                    author: "hotel_agent".to_string(),
                    content: Some(EventContent {
                        parts: vec![EventPart { text: None }],
                    }),
                    is_final: true,
                    timestamp: chrono::Utc::now(),
                },
            }
        };

        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, if any.
    fn reply_text(self) -> Option<String> {
        let parts = self
            .candidates?
            .into_iter()
            .next()?
            .content?
            .parts?;

        let text: String = parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
