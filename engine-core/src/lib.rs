//! Environment contract shared by every game in the workspace
//!
//! - `Game`: typed trait game crates implement
//! - `ErasedGame`: runtime interface that works only with bytes
//! - `GameAdapter`: turns any `Game` into an `ErasedGame`
//! - `registry`: env_id -> factory lookup used by harnesses

pub mod typed;
pub mod erased;
pub mod adapter;
pub mod registry;

#[cfg(test)]
mod testing;

pub use typed::{ActionSpace, Capabilities, DecodeError, EncodeError, EngineId, Encoding, Game, GameError};
pub use erased::{ErasedGame, ErasedGameError};
pub use adapter::GameAdapter;
pub use registry::{create_game, is_registered, list_registered_games, register_game, GameFactory};
