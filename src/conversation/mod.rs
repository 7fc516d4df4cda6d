//! The conversation loop state machine.

use std::sync::Arc;

use tracing::warn;

use crate::context::AppContext;
use crate::session::SessionRef;
use crate::speech::{ConsoleOutput, SpeechOutput, SttClient, TtsClient};
use crate::turn::TurnExecutor;

/// Phrases that end the conversation, compared case-insensitively
/// against the trimmed utterance.
pub const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

/// States of the conversation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    ExecutingTurn { utterance: String },
    Speaking { reply: String },
    Terminated,
}

/// Whether an utterance requests termination.
pub fn is_exit_phrase(utterance: &str) -> bool {
    let trimmed = utterance.trim();
    EXIT_KEYWORDS
        .iter()
        .any(|keyword| trimmed.eq_ignore_ascii_case(keyword))
}

/// Orchestrates repeated turns: capture input, check for the exit
/// phrase, execute the turn, speak the reply, repeat.
///
/// Every adapter and executor call is caught and logged; only the exit
/// keyword leaves the loop.
pub struct ConversationLoop {
    input: SttClient,
    output: TtsClient,
    output_strategies: Vec<Arc<dyn SpeechOutput>>,
    executor: TurnExecutor,
}

impl ConversationLoop {
    pub fn new(ctx: AppContext) -> Self {
        let executor = TurnExecutor::new(
            Arc::clone(&ctx.runner),
            Arc::clone(&ctx.sessions),
            ctx.verbose,
        );
        let default_output: Arc<dyn SpeechOutput> = ctx
            .outputs
            .first()
            .cloned()
            .unwrap_or_else(|| Arc::new(ConsoleOutput::new()));
        Self {
            input: ctx.input,
            output: TtsClient::new(default_output),
            output_strategies: ctx.outputs,
            executor,
        }
    }

    /// Run until the exit keyword. Blocks within each state on the
    /// adapter or executor call for that state; no timeouts, no
    /// mid-turn cancellation.
    pub async fn run(&mut self, session: &SessionRef) {
        let mut state = LoopState::AwaitingInput;

        loop {
            state = match state {
                LoopState::AwaitingInput => self.await_input().await,
                LoopState::ExecutingTurn { utterance } => {
                    self.execute_turn(session, &utterance).await
                }
                LoopState::Speaking { reply } => self.speak(&reply).await,
                LoopState::Terminated => {
                    println!("Ending conversation. Goodbye!");
                    return;
                }
            };
        }
    }

    async fn await_input(&self) -> LoopState {
        let utterance = match self.input.listen_and_transcribe().await {
            Ok(utterance) => utterance,
            Err(err) => {
                warn!(error = %err, strategy = %self.input.strategy_name(), "Speech input failed");
                return LoopState::AwaitingInput;
            }
        };

        if is_exit_phrase(&utterance) {
            return LoopState::Terminated;
        }
        if utterance.trim().is_empty() {
            return LoopState::AwaitingInput;
        }

        LoopState::ExecutingTurn { utterance }
    }

    async fn execute_turn(&self, session: &SessionRef, utterance: &str) -> LoopState {
        match self.executor.execute(session, utterance).await {
            Some(reply) => {
                println!("Agent: {reply}");
                LoopState::Speaking { reply }
            }
            None => {
                println!("Agent: (no reply)");
                LoopState::AwaitingInput
            }
        }
    }

    /// Speak the reply once through every configured strategy, in
    /// configuration order, swapping the holder's strategy between each.
    async fn speak(&mut self, reply: &str) -> LoopState {
        for strategy in &self.output_strategies {
            self.output.set_strategy(Arc::clone(strategy));
            if let Err(err) = self.output.speak(reply).await {
                warn!(error = %err, strategy = %self.output.strategy_name(), "Speech output failed");
            }
        }
        LoopState::AwaitingInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_phrases_are_case_insensitive() {
        assert!(is_exit_phrase("exit"));
        assert!(is_exit_phrase("QUIT"));
        assert!(is_exit_phrase("  Exit  "));
        assert!(!is_exit_phrase("exit now"));
        assert!(!is_exit_phrase("book a room"));
        assert!(!is_exit_phrase(""));
    }
}
