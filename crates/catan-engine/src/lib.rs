//! Catan Engine - a turn-based resource game for benchmarking decision-makers
//!
//! This crate provides the game logic, including:
//! - A minimal linear board of intersections joined by paths
//! - Player state and resource management
//! - Legal-action enumeration with a stable ordering
//! - A turn engine with a discard phase after a rolled 7
//! - Decision-makers and the text-to-action decoding they rely on
//!
//! # Architecture
//!
//! [`TurnEngine`] is the only owner of mutable game state. Each step a
//! decision-maker receives a [`GameState`] snapshot and the list from
//! [`TurnEngine::get_legal_actions`], answers with an index, and the driver
//! passes the chosen [`Action`] back to [`TurnEngine::apply`].
//!
//! # Modules
//!
//! - [`board`]: Intersections, paths, buildings and roads
//! - [`player`]: Resource hands, building costs, per-seat state
//! - [`actions`]: Actions, events and rule-conflict errors
//! - [`catalog`]: Legal-action enumeration
//! - [`game`]: The turn engine
//! - [`snapshot`]: Read-only game snapshots
//! - [`decode`]: Recovering an action index from free-form text
//! - [`agent`]: Built-in decision-makers

pub mod actions;
pub mod agent;
pub mod board;
pub mod catalog;
pub mod decode;
pub mod game;
pub mod player;
pub mod snapshot;

// Re-export commonly used types
pub use actions::{Action, ActionError, ActionKind, GameEvent};
pub use agent::{
    Agent, HeuristicAgent, RandomAgent, ResponseAgent, ResponseSource, SourceError, StubResponder,
};
pub use board::{Board, Building, IntersectionId, Path, Resource, Seat};
pub use decode::{Decision, DecodeError};
pub use game::{
    ConfigError, EngineConfig, EngineError, StepInfo, StepOutcome, TurnEngine, TurnPhase,
};
pub use player::{Player, ResourceHand};
pub use snapshot::GameState;
