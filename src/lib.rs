//! Voice-driven hotel customer support assistant.
//!
//! Wires a conversational agent runtime (Gemini), cloud speech-to-text,
//! and cloud text-to-speech into a listen/respond loop over an
//! in-memory session seeded with the hotel's room inventory.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use concierge::session::{ConversationState, InMemorySessionService, SessionService};
//!
//! # async fn example() -> concierge::error::Result<()> {
//! let sessions = Arc::new(InMemorySessionService::new());
//! let session = sessions
//!     .create_session("Hotel Customer Support", "user-1", ConversationState::initial())
//!     .await?;
//! println!("Created new session: {}", session.id);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod conversation;
pub mod error;
pub mod session;
pub mod speech;
pub mod turn;
pub mod util;
