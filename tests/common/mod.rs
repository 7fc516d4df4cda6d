//! Shared test doubles: scripted agent runner and speech adapters.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use concierge::agent::{AgentRunner, TurnEvent, TurnEventStream};
use concierge::error::{ConciergeError, Result};
use concierge::session::SessionRef;
use concierge::speech::{SpeechInput, SpeechOutput};

/// Agent runner that replays pre-scripted event sequences, one per turn.
pub struct ScriptedRunner {
    turns: Mutex<VecDeque<Vec<Result<TurnEvent>>>>,
    calls: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new(turns: Vec<Vec<Result<TurnEvent>>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentRunner for ScriptedRunner {
    async fn run_turn(&self, _session: &SessionRef, _message: &str) -> Result<TurnEventStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let events = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(futures::stream::iter(events).boxed())
    }
}

/// Speech input that pops scripted utterances; empty queue means "exit".
pub struct QueueInput {
    utterances: Mutex<VecDeque<Result<String>>>,
}

impl QueueInput {
    pub fn new(utterances: Vec<&str>) -> Self {
        Self {
            utterances: Mutex::new(
                utterances
                    .into_iter()
                    .map(|u| Ok(u.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn with_results(utterances: Vec<Result<String>>) -> Self {
        Self {
            utterances: Mutex::new(utterances.into()),
        }
    }
}

#[async_trait]
impl SpeechInput for QueueInput {
    fn name(&self) -> &str {
        "queue"
    }

    async fn listen_and_transcribe(&self) -> Result<String> {
        self.utterances
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("exit".to_string()))
    }
}

/// Speech output that records every spoken string into a shared log.
pub struct RecordingOutput {
    name: String,
    log: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingOutput {
    pub fn new(name: &str, log: Arc<Mutex<Vec<(String, String)>>>) -> Self {
        Self {
            name: name.to_string(),
            log,
        }
    }
}

#[async_trait]
impl SpeechOutput for RecordingOutput {
    fn name(&self) -> &str {
        &self.name
    }

    async fn speak(&self, text: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), text.to_string()));
        Ok(())
    }
}

/// Speech output that always fails.
pub struct FailingOutput;

#[async_trait]
impl SpeechOutput for FailingOutput {
    fn name(&self) -> &str {
        "failing"
    }

    async fn speak(&self, _text: &str) -> Result<()> {
        Err(ConciergeError::Audio("synthesis backend down".to_string()))
    }
}
