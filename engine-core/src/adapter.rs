//! Adapter layer converting typed games to erased interface
//!
//! [`GameAdapter`] wraps any [`Game`] and implements [`ErasedGame`] on top of
//! it: it decodes inputs, runs the typed transition, encodes the outputs and
//! owns the random number generator the game draws from.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::erased::{ErasedGame, ErasedGameError};
use crate::typed::{Capabilities, EngineId, Game};

/// Adapter that converts typed games to erased interface
///
/// The RNG is re-seeded on every reset, so an episode is fully determined by
/// its reset seed and the actions applied afterwards.
///
/// # Example
///
/// ```rust
/// # use engine_core::adapter::GameAdapter;
/// # use engine_core::erased::ErasedGame;
/// # use engine_core::typed::*;
/// # use rand_chacha::ChaCha20Rng;
/// # #[derive(Default)]
/// # struct MyGame;
/// # impl Game for MyGame {
/// #     type State = u32;
/// #     type Action = u8;
/// #     type Obs = Vec<f32>;
/// #     fn engine_id(&self) -> EngineId { EngineId { env_id: "my_game".into(), build_id: "0".into() } }
/// #     fn capabilities(&self) -> Capabilities { todo!() }
/// #     fn reset(&mut self, rng: &mut ChaCha20Rng, hint: &[u8]) -> (Self::State, Self::Obs) { todo!() }
/// #     fn step(&mut self, state: &mut Self::State, action: Self::Action, rng: &mut ChaCha20Rng) -> Result<(Self::Obs, f32, bool), GameError> { todo!() }
/// #     fn encode_state(state: &Self::State, out: &mut Vec<u8>) -> Result<(), EncodeError> { todo!() }
/// #     fn decode_state(buf: &[u8]) -> Result<Self::State, DecodeError> { todo!() }
/// #     fn encode_action(action: &Self::Action, out: &mut Vec<u8>) -> Result<(), EncodeError> { todo!() }
/// #     fn decode_action(buf: &[u8]) -> Result<Self::Action, DecodeError> { todo!() }
/// #     fn encode_obs(obs: &Self::Obs, out: &mut Vec<u8>) -> Result<(), EncodeError> { todo!() }
/// # }
/// let erased_game: Box<dyn ErasedGame> = Box::new(GameAdapter::new(MyGame::default()));
/// assert_eq!(erased_game.engine_id().env_id, "my_game");
/// ```
pub struct GameAdapter<T: Game> {
    game: T,
    rng: ChaCha20Rng,
}

impl<T: Game> GameAdapter<T> {
    /// Create a new adapter wrapping the given game
    pub fn new(game: T) -> Self {
        Self {
            game,
            rng: ChaCha20Rng::seed_from_u64(0), // Re-seeded on reset
        }
    }

    /// Get a reference to the underlying game
    pub fn game(&self) -> &T {
        &self.game
    }

    /// Get a mutable reference to the underlying game
    pub fn game_mut(&mut self) -> &mut T {
        &mut self.game
    }

    /// Consume the adapter and return the underlying game
    pub fn into_inner(self) -> T {
        self.game
    }
}

impl<T: Game> ErasedGame for GameAdapter<T> {
    fn engine_id(&self) -> EngineId {
        self.game.engine_id()
    }

    fn capabilities(&self) -> Capabilities {
        self.game.capabilities()
    }

    fn reset(
        &mut self,
        seed: u64,
        hint: &[u8],
        out_state: &mut Vec<u8>,
        out_obs: &mut Vec<u8>,
    ) -> Result<(), ErasedGameError> {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        out_state.clear();
        out_obs.clear();

        let (state, obs) = self.game.reset(&mut self.rng, hint);
        debug!(seed, env_id = %self.game.engine_id().env_id, "environment reset");

        T::encode_state(&state, out_state).map_err(|e| ErasedGameError::Encoding(e.to_string()))?;
        T::encode_obs(&obs, out_obs).map_err(|e| ErasedGameError::Encoding(e.to_string()))?;
        Ok(())
    }

    fn step(
        &mut self,
        state: &[u8],
        action: &[u8],
        out_state: &mut Vec<u8>,
        out_obs: &mut Vec<u8>,
    ) -> Result<(f32, bool), ErasedGameError> {
        out_state.clear();
        out_obs.clear();

        let mut state =
            T::decode_state(state).map_err(|e| ErasedGameError::Decoding(e.to_string()))?;
        let action =
            T::decode_action(action).map_err(|e| ErasedGameError::Decoding(e.to_string()))?;

        let (obs, reward, done) = self
            .game
            .step(&mut state, action, &mut self.rng)
            .map_err(|e| ErasedGameError::GameLogic(e.to_string()))?;

        T::encode_state(&state, out_state).map_err(|e| ErasedGameError::Encoding(e.to_string()))?;
        T::encode_obs(&obs, out_obs).map_err(|e| ErasedGameError::Encoding(e.to_string()))?;
        Ok((reward, done))
    }
}
