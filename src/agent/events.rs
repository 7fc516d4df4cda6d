//! Turn event stream types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One item of the asynchronous stream produced by the agent runtime
/// for a single submitted utterance.
///
/// Optional fields are modeled explicitly; consumers unwrap with a
/// defined fallback rather than probing attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEvent {
    pub id: Uuid,
    pub author: String,
    pub content: Option<EventContent>,
    pub is_final: bool,
    pub timestamp: DateTime<Utc>,
}

/// Content carried by a turn event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContent {
    pub parts: Vec<EventPart>,
}

/// A single content part, optionally carrying text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPart {
    pub text: Option<String>,
}

impl TurnEvent {
    /// A final-response event carrying reply text.
    pub fn final_reply(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            content: Some(EventContent {
                parts: vec![EventPart {
                    text: Some(text.into()),
                }],
            }),
            is_final: true,
            timestamp: Utc::now(),
        }
    }

    /// A non-final progress event with no content.
    pub fn progress(author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            content: None,
            is_final: false,
            timestamp: Utc::now(),
        }
    }

    /// Text of the first content part, if any.
    pub fn first_part_text(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_part_text_handles_missing_content() {
        assert_eq!(TurnEvent::progress("agent").first_part_text(), None);
    }

    #[test]
    fn first_part_text_handles_empty_parts() {
        let mut event = TurnEvent::final_reply("agent", "hi");
        event.content = Some(EventContent { parts: Vec::new() });
        assert_eq!(event.first_part_text(), None);
    }

    #[test]
    fn first_part_text_returns_first_part_only() {
        let mut event = TurnEvent::final_reply("agent", "first");
        if let Some(content) = event.content.as_mut() {
            content.parts.push(EventPart {
                text: Some("second".to_string()),
            });
        }
        assert_eq!(event.first_part_text(), Some("first"));
    }
}
