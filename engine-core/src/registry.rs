//! Process-wide game registry
//!
//! Game crates register a factory under their env_id at startup; harnesses
//! then create fresh erased instances by id without depending on the game
//! crate's types.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use tracing::warn;

use crate::erased::ErasedGame;

/// Factory function type for creating game instances
pub type GameFactory = fn() -> Box<dyn ErasedGame>;

static REGISTRY: Lazy<Mutex<HashMap<String, GameFactory>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

// Factories are plain fn pointers, so a panic elsewhere cannot leave the map
// half-updated and a poisoned lock is safe to keep using.
fn registry() -> MutexGuard<'static, HashMap<String, GameFactory>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register a game with the global registry
///
/// Registering an env_id twice replaces the earlier factory.
///
/// # Example
///
/// ```rust
/// # use engine_core::registry::*;
/// # use engine_core::erased::{ErasedGame, ErasedGameError};
/// # use engine_core::typed::*;
/// # struct Stub;
/// # impl ErasedGame for Stub {
/// #     fn engine_id(&self) -> EngineId { EngineId { env_id: "stub".into(), build_id: "0".into() } }
/// #     fn capabilities(&self) -> Capabilities { todo!() }
/// #     fn reset(&mut self, _: u64, _: &[u8], _: &mut Vec<u8>, _: &mut Vec<u8>) -> Result<(), ErasedGameError> { Ok(()) }
/// #     fn step(&mut self, _: &[u8], _: &[u8], _: &mut Vec<u8>, _: &mut Vec<u8>) -> Result<(f32, bool), ErasedGameError> { Ok((0.0, true)) }
/// # }
/// fn stub_factory() -> Box<dyn ErasedGame> {
///     Box::new(Stub)
/// }
///
/// register_game("stub".to_string(), stub_factory);
/// assert!(is_registered("stub"));
/// ```
pub fn register_game(env_id: String, factory: GameFactory) {
    let mut registry = registry();
    if registry.contains_key(&env_id) {
        warn!(env_id = %env_id, "overriding existing game registration");
    }
    registry.insert(env_id, factory);
}

/// Create a new game instance by env_id
///
/// Returns `None` if nothing is registered under `env_id`.
pub fn create_game(env_id: &str) -> Option<Box<dyn ErasedGame>> {
    let registry = registry();
    registry.get(env_id).map(|factory| factory())
}

/// Get list of all registered environment IDs, sorted
pub fn list_registered_games() -> Vec<String> {
    let registry = registry();
    let mut ids: Vec<String> = registry.keys().cloned().collect();
    ids.sort();
    ids
}

/// Check if a game is registered
pub fn is_registered(env_id: &str) -> bool {
    registry().contains_key(env_id)
}

/// Register a `Default`-constructible typed game behind a [`crate::GameAdapter`]
///
/// ```ignore
/// register_game!(Dustbiters, "dustbiters");
/// ```
#[macro_export]
macro_rules! register_game {
    ($game_type:ty, $env_id:expr) => {{
        fn factory() -> Box<dyn $crate::erased::ErasedGame> {
            Box::new($crate::adapter::GameAdapter::new(<$game_type>::default()))
        }
        $crate::registry::register_game($env_id.to_string(), factory);
    }};
}
