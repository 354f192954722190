//! Dustbiters: a two-player convoy card game
//!
//! Each player starts with four cars in a shared convoy and four in hand. On
//! a turn a player may take up to three actions (build a car from hand onto
//! the back of the convoy, drive any convoy car one place forward or
//! backward, draw from the deck) or end early. Every turn closes with a
//! sandstorm that destroys the car at the front of the convoy. A player whose
//! convoy is wiped out loses.
//!
//! - [`GameEngine`]: rules and turn protocol over a [`GameState`]
//! - [`LearningAdapter`]: fixed action indices and a 66-slot observation
//! - [`Dustbiters`]: the engine behind the `engine_core::Game` contract

pub mod action;
pub mod card;
pub mod codec;
pub mod engine;
pub mod env;
pub mod learning;
pub mod state;

pub use action::{Action, Direction};
pub use card::{Card, CARD_COUNT};
pub use engine::{EngineError, GameEngine, StepResult, INVALID_ACTION_PENALTY};
pub use env::{register, Dustbiters, ENV_ID};
pub use learning::{
    encode_observation, resolve_action, AdapterStep, EncodedObservation, LearningAdapter,
    Resolution, StepInfo, MAX_ACTIONS, OBS_LEN,
};
pub use state::{GameState, Observation, Outcome, Player, PlayerId, StateError, StateParts};
