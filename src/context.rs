//! Application context: everything the loop needs, built once at startup.

use std::sync::Arc;

use crate::agent::AgentRunner;
use crate::session::SessionService;
use crate::speech::{SpeechOutput, SttClient};

/// Explicit application context replacing module-level singletons.
/// Constructed once in `main` and handed to the conversation loop;
/// configuration stays behind in `main`, where the providers are built.
pub struct AppContext {
    pub sessions: Arc<dyn SessionService>,
    pub runner: Arc<dyn AgentRunner>,
    pub input: SttClient,
    /// Output strategies the reply is spoken through, in order.
    pub outputs: Vec<Arc<dyn SpeechOutput>>,
    pub verbose: bool,
}
