//! Canned-answer oracle
//!
//! Replays queued answers in order. With an empty queue every call fails
//! with an oracle error, which is how an instance without an API key behaves.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::Oracle;
use crate::types::{Result, TeamUpError};

pub struct ScriptedOracle {
    answers: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful answer
    pub fn push_answer(&self, text: impl Into<String>) -> &Self {
        self.push(Ok(text.into()))
    }

    /// Queue a failure
    pub fn push_failure(&self, err: TeamUpError) -> &Self {
        self.push(Err(err))
    }

    fn push(&self, answer: Result<String>) -> &Self {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
        self
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self
            .answers
            .lock()
            .map_err(|_| TeamUpError::Internal("scripted oracle lock poisoned".into()))?
            .pop_front();

        next.unwrap_or_else(|| Err(TeamUpError::Oracle("no oracle configured".into())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
