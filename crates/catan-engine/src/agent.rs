//! Decision-makers that pick one action per step.
//!
//! This module provides:
//! - [`Agent`], the seam the run driver talks to
//! - RandomAgent: uniform choice, the baseline
//! - HeuristicAgent: build first, then trade, then end the turn
//! - ResponseAgent: wraps an external text source and decodes its reply

use crate::actions::Action;
use crate::decode::{self, Decision};
use crate::snapshot::GameState;
use rand::prelude::*;
use thiserror::Error;
use tracing::warn;

/// Something that picks an index into the legal action list
pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Pick one of `actions` for the seat to move in `state`.
    ///
    /// `actions` is never empty when called by the run driver.
    fn choose(&mut self, state: &GameState, actions: &[Action]) -> Decision;
}

/// Uniformly random choice
pub struct RandomAgent {
    name: String,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose(&mut self, _state: &GameState, actions: &[Action]) -> Decision {
        if actions.is_empty() {
            return Decision::fallback(0);
        }
        Decision::direct(self.rng.gen_range(0..actions.len()))
    }
}

/// Always plays [`decode::fallback_index`]: build, bank trade, discard, end turn
pub struct HeuristicAgent {
    name: String,
}

impl HeuristicAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose(&mut self, _state: &GameState, actions: &[Action]) -> Decision {
        match decode::fallback_index(actions) {
            Some(index) => Decision::direct(index),
            None => Decision::fallback(0),
        }
    }
}

/// Failure to obtain a response from an external source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Source timed out")]
    Timeout,
}

/// External producer of free-form decision text.
///
/// Receives the snapshot and the legal actions; prompt wording and transport
/// are up to the implementation.
pub trait ResponseSource: Send {
    fn respond(&mut self, state: &GameState, actions: &[Action]) -> Result<String, SourceError>;
}

impl<F> ResponseSource for F
where
    F: FnMut(&GameState, &[Action]) -> Result<String, SourceError> + Send,
{
    fn respond(&mut self, state: &GameState, actions: &[Action]) -> Result<String, SourceError> {
        self(state, actions)
    }
}

/// Offline source that always answers [`decode::FAILURE_REPLY`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StubResponder;

impl ResponseSource for StubResponder {
    fn respond(&mut self, _state: &GameState, _actions: &[Action]) -> Result<String, SourceError> {
        Ok(decode::FAILURE_REPLY.to_string())
    }
}

/// Agent backed by a [`ResponseSource`]
pub struct ResponseAgent<S> {
    name: String,
    source: S,
    last_response: Option<String>,
}

impl<S: ResponseSource> ResponseAgent<S> {
    pub fn new(name: impl Into<String>, source: S) -> Self {
        Self {
            name: name.into(),
            source,
            last_response: None,
        }
    }

    /// Raw text of the most recent reply
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }
}

impl<S: ResponseSource> Agent for ResponseAgent<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose(&mut self, state: &GameState, actions: &[Action]) -> Decision {
        match self.source.respond(state, actions) {
            Ok(raw) => {
                let decision = decode::resolve(&raw, actions);
                self.last_response = Some(raw);
                decision
            }
            Err(err) => {
                warn!(agent = %self.name, error = %err, "response source failed");
                self.last_response = None;
                Decision::fallback(decode::fallback_index(actions).unwrap_or(0))
            }
        }
    }
}
