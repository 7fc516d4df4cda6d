//! Turn execution: one utterance in, at most one final reply out.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::agent::AgentRunner;
use crate::error::Result;
use crate::session::{render_state, SessionRef, SessionService};

/// Sends one user utterance to the agent runtime and extracts the final
/// textual reply from the resulting event stream.
pub struct TurnExecutor {
    runner: Arc<dyn AgentRunner>,
    sessions: Arc<dyn SessionService>,
    verbose: bool,
}

impl TurnExecutor {
    pub fn new(
        runner: Arc<dyn AgentRunner>,
        sessions: Arc<dyn SessionService>,
        verbose: bool,
    ) -> Self {
        Self {
            runner,
            sessions,
            verbose,
        }
    }

    /// Execute one turn. Returns the final reply text, or `None` when the
    /// stream produced no usable final response or failed mid-iteration.
    ///
    /// Errors never escape the turn boundary; the conversation loop must
    /// keep going regardless of what the runtime did.
    pub async fn execute(&self, session: &SessionRef, utterance: &str) -> Option<String> {
        self.display_state(session).await;

        let reply = self.run_and_extract(session, utterance).await;

        self.display_state(session).await;
        reply
    }

    async fn run_and_extract(&self, session: &SessionRef, utterance: &str) -> Option<String> {
        let mut stream = match self.runner.run_turn(session, utterance).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "Agent turn failed to start");
                return None;
            }
        };

        // Events are consumed strictly in delivery order; when several
        // events are flagged final, the last one's text wins.
        let mut candidate: Option<String> = None;
        while let Some(event) = stream.next().await {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "Error during agent turn");
                    return None;
                }
            };

            if self.verbose {
                debug!(event_id = %event.id, author = %event.author, is_final = event.is_final, "turn event");
            }

            if !event.is_final {
                continue;
            }

            match event.first_part_text() {
                Some(text) if !text.trim().is_empty() => {
                    candidate = Some(text.trim().to_string());
                }
                _ => {
                    debug!(event_id = %event.id, "No final response text found in event content");
                }
            }
        }

        candidate
    }

    /// Print the current session state. Active only in verbose mode.
    async fn display_state(&self, session: &SessionRef) {
        if !self.verbose {
            return;
        }
        if let Err(err) = self.try_display_state(session).await {
            warn!(error = %err, "Failed to display session state");
        }
    }

    async fn try_display_state(&self, session: &SessionRef) -> Result<()> {
        let snapshot = self.sessions.get_session(session).await?;
        println!("\nCurrent Session State:");
        print!("{}", render_state(&snapshot.state));
        println!("\n{}\n", "=".repeat(30));
        Ok(())
    }
}
