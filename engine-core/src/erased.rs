//! Erased Game interface for runtime polymorphism
//!
//! Harnesses that pick an environment by id at runtime drive it through this
//! bytes-only trait. Typed games are converted to it by [`crate::GameAdapter`].

use crate::typed::{Capabilities, EngineId};

/// Runtime error for erased game operations
#[derive(Debug, thiserror::Error)]
pub enum ErasedGameError {
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
    #[error("Game logic error: {0}")]
    GameLogic(String),
}

/// Erased game trait that works only with bytes
///
/// Results are written into caller-provided buffers so a harness can reuse
/// its allocations from step to step.
///
/// # Example Usage
///
/// ```rust
/// # use engine_core::erased::*;
/// fn first_step(game: &mut dyn ErasedGame) -> Result<(f32, bool), ErasedGameError> {
///     let mut state_buf = Vec::new();
///     let mut obs_buf = Vec::new();
///     game.reset(42, &[], &mut state_buf, &mut obs_buf)?;
///
///     let action = 0u32.to_le_bytes();
///     let mut next_state = Vec::new();
///     game.step(&state_buf, &action, &mut next_state, &mut obs_buf)
/// }
/// ```
pub trait ErasedGame: Send + Sync + 'static {
    /// Get engine identification information
    fn engine_id(&self) -> EngineId;

    /// Get game capabilities and configuration
    fn capabilities(&self) -> Capabilities;

    /// Reset the game to initial state
    ///
    /// # Arguments
    ///
    /// * `seed` - Random seed for deterministic reset
    /// * `hint` - Optional hint data for environment setup
    /// * `out_state` - Buffer to write encoded initial state
    /// * `out_obs` - Buffer to write encoded initial observation
    ///
    /// # Errors
    ///
    /// Returns `ErasedGameError` if encoding fails
    fn reset(
        &mut self,
        seed: u64,
        hint: &[u8],
        out_state: &mut Vec<u8>,
        out_obs: &mut Vec<u8>,
    ) -> Result<(), ErasedGameError>;

    /// Perform one simulation step
    ///
    /// Returns `Ok((reward, done))` on success.
    ///
    /// # Errors
    ///
    /// Returns `ErasedGameError::Decoding` for malformed state or action bytes
    /// and `ErasedGameError::GameLogic` when the encoded state is already terminal.
    fn step(
        &mut self,
        state: &[u8],
        action: &[u8],
        out_state: &mut Vec<u8>,
        out_obs: &mut Vec<u8>,
    ) -> Result<(f32, bool), ErasedGameError>;
}
