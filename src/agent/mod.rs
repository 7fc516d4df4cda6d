//! Agent runtime seam: turn events and the runner trait.

pub mod events;
pub mod gemini;

pub use events::{EventContent, EventPart, TurnEvent};
pub use gemini::GeminiAgentRunner;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::session::SessionRef;

/// Event stream produced for one submitted utterance.
pub type TurnEventStream = BoxStream<'static, Result<TurnEvent>>;

/// Executes one conversational turn against an agent runtime.
///
/// The stream is consumed strictly in delivery order; the runtime owns
/// session-state mutation and event production.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run_turn(&self, session: &SessionRef, message: &str) -> Result<TurnEventStream>;
}
