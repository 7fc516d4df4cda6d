//! Per-conversation session state and the in-memory session store.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConciergeError, Result};

/// Room category offered by the hotel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Single,
    Double,
    Suite,
}

/// One entry of the room inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub price: u32,
    pub available: bool,
}

/// A booking recorded during the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub room_id: String,
    pub booked_at: DateTime<Utc>,
}

/// An open customer issue recorded during the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub description: String,
    pub opened_at: DateTime<Utc>,
}

/// State attached to one conversation session.
///
/// Created once at session start, mutated only through the session
/// service (by the agent runtime side), and discarded with the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub user_name: String,
    pub recent_bookings: Vec<Booking>,
    pub pending_issues: Vec<Issue>,
    pub rooms_db: BTreeMap<String, Room>,
}

impl ConversationState {
    /// The fixed snapshot every new session starts from.
    pub fn initial() -> Self {
        let mut rooms_db = BTreeMap::new();
        rooms_db.insert(
            "room_101".to_string(),
            Room {
                kind: RoomKind::Single,
                price: 100,
                available: true,
            },
        );
        rooms_db.insert(
            "room_102".to_string(),
            Room {
                kind: RoomKind::Double,
                price: 150,
                available: true,
            },
        );
        rooms_db.insert(
            "room_103".to_string(),
            Room {
                kind: RoomKind::Suite,
                price: 300,
                available: false,
            },
        );
        rooms_db.insert(
            "room_104".to_string(),
            Room {
                kind: RoomKind::Single,
                price: 100,
                available: true,
            },
        );

        Self {
            user_name: "User".to_string(),
            recent_bookings: Vec::new(),
            pending_issues: Vec::new(),
            rooms_db,
        }
    }
}

/// Identifiers naming one session; passed by reference instead of loose strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionRef {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

/// A session handle returned by the store.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub state: ConversationState,
}

/// Store for per-conversation state.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a session seeded with `initial_state` and return its handle.
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        initial_state: ConversationState,
    ) -> Result<Session>;

    /// Fetch a session, or `SessionNotFound`.
    async fn get_session(&self, session: &SessionRef) -> Result<Session>;

    /// Replace a session's state. Mutation entry point for the runtime side.
    async fn update_state(&self, session: &SessionRef, state: ConversationState) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    app_name: String,
    user_id: String,
    session_id: String,
}

impl SessionKey {
    fn from_ref(session: &SessionRef) -> Self {
        Self {
            app_name: session.app_name.clone(),
            user_id: session.user_id.clone(),
            session_id: session.session_id.clone(),
        }
    }
}

/// Process-wide in-memory session store. Lives for the process lifetime;
/// no teardown beyond process exit.
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: RwLock<HashMap<SessionKey, ConversationState>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        initial_state: ConversationState,
    ) -> Result<Session> {
        let session_id = Uuid::new_v4().to_string();
        let key = SessionKey {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.clone(),
        };
        self.sessions
            .write()
            .unwrap()
            .insert(key, initial_state.clone());

        Ok(Session {
            id: session_id,
            state: initial_state,
        })
    }

    async fn get_session(&self, session: &SessionRef) -> Result<Session> {
        let key = SessionKey::from_ref(session);
        let sessions = self.sessions.read().unwrap();
        let state = sessions
            .get(&key)
            .cloned()
            .ok_or_else(|| ConciergeError::SessionNotFound {
                session_id: session.session_id.clone(),
            })?;

        Ok(Session {
            id: session.session_id.clone(),
            state,
        })
    }

    async fn update_state(&self, session: &SessionRef, state: ConversationState) -> Result<()> {
        let key = SessionKey::from_ref(session);
        let mut sessions = self.sessions.write().unwrap();
        let slot = sessions
            .get_mut(&key)
            .ok_or_else(|| ConciergeError::SessionNotFound {
                session_id: session.session_id.clone(),
            })?;
        *slot = state;
        Ok(())
    }
}

/// Render every state key/value pair, one per line, for the verbose
/// display hook and the final snapshot print. Keys come out in struct
/// declaration order (serde_json is built with `preserve_order`).
pub fn render_state(state: &ConversationState) -> String {
    let value = serde_json::to_value(state).unwrap_or(serde_json::Value::Null);
    let mut out = String::new();
    if let serde_json::Value::Object(map) = value {
        for (key, value) in map {
            out.push_str(&format!("{key}: {value}\n"));
        }
    }
    out
}
