//! Typed Game trait providing ergonomic interface for game developers
//!
//! Games implement [`Game`] with their own state, action and observation types
//! and get compile-time checking of every transition. The adapter layer turns
//! any implementation into the byte-level [`crate::ErasedGame`] interface used
//! by harnesses that only know an environment by its id.

use rand_chacha::ChaCha20Rng;

/// Engine identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineId {
    pub env_id: String,
    pub build_id: String,
}

/// Names of the byte encodings a game uses on the erased boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub state: String,
    pub action: String,
    pub obs: String,
    pub schema_version: u32,
}

/// Action space exposed to decision processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSpace {
    /// `n` actions addressed by the indices `0..n`
    Discrete(u32),
}

impl ActionSpace {
    /// Number of addressable actions
    pub fn size(&self) -> u32 {
        match self {
            ActionSpace::Discrete(n) => *n,
        }
    }
}

/// Game capabilities and configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub id: EngineId,
    pub encoding: Encoding,
    /// Upper bound on the number of steps a harness should allow per episode
    pub max_horizon: u32,
    pub action_space: ActionSpace,
    /// Number of observation elements produced per step
    pub obs_len: u32,
    pub preferred_batch: u32,
}

/// Main trait for game implementations
///
/// # Type Parameters
///
/// * `State` - Complete game state, passed back in on every step
/// * `Action` - Action chosen by the caller, usually an index into the action space
/// * `Obs` - Observation handed to the decision process
///
/// # Example
///
/// ```rust
/// # use engine_core::typed::*;
/// # use rand_chacha::ChaCha20Rng;
/// struct Coin;
///
/// impl Game for Coin {
///     type State = bool;
///     type Action = u8;
///     type Obs = [i32; 1];
///
///     // Implementation methods...
/// #   fn engine_id(&self) -> EngineId { todo!() }
/// #   fn capabilities(&self) -> Capabilities { todo!() }
/// #   fn reset(&mut self, rng: &mut ChaCha20Rng, hint: &[u8]) -> (Self::State, Self::Obs) { todo!() }
/// #   fn step(&mut self, state: &mut Self::State, action: Self::Action, rng: &mut ChaCha20Rng) -> Result<(Self::Obs, f32, bool), GameError> { todo!() }
/// #   fn encode_state(state: &Self::State, out: &mut Vec<u8>) -> Result<(), EncodeError> { todo!() }
/// #   fn decode_state(buf: &[u8]) -> Result<Self::State, DecodeError> { todo!() }
/// #   fn encode_action(action: &Self::Action, out: &mut Vec<u8>) -> Result<(), EncodeError> { todo!() }
/// #   fn decode_action(buf: &[u8]) -> Result<Self::Action, DecodeError> { todo!() }
/// #   fn encode_obs(obs: &Self::Obs, out: &mut Vec<u8>) -> Result<(), EncodeError> { todo!() }
/// }
/// ```
pub trait Game: Send + Sync + 'static {
    type State: Send + Sync + 'static;
    type Action: Send + Sync + 'static;
    type Obs: Send + Sync + 'static;

    /// Get engine identification information
    fn engine_id(&self) -> EngineId;

    /// Get game capabilities and configuration
    fn capabilities(&self) -> Capabilities;

    /// Start a new episode
    ///
    /// # Arguments
    ///
    /// * `rng` - Deterministic random number generator for reproducible resets
    /// * `hint` - Optional hint data for environment setup
    ///
    /// # Returns
    ///
    /// A tuple of (initial_state, initial_observation)
    fn reset(&mut self, rng: &mut ChaCha20Rng, hint: &[u8]) -> (Self::State, Self::Obs);

    /// Perform one simulation step
    ///
    /// # Returns
    ///
    /// A tuple of (observation, reward, done) for the caller that acted.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Finished`] when `state` is already terminal. That is
    /// a caller bug and must be surfaced, not ignored.
    fn step(
        &mut self,
        state: &mut Self::State,
        action: Self::Action,
        rng: &mut ChaCha20Rng,
    ) -> Result<(Self::Obs, f32, bool), GameError>;

    /// Encode state to bytes
    fn encode_state(state: &Self::State, out: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Decode state from bytes
    fn decode_state(buf: &[u8]) -> Result<Self::State, DecodeError>;

    /// Encode action to bytes
    fn encode_action(action: &Self::Action, out: &mut Vec<u8>) -> Result<(), EncodeError>;

    /// Decode action from bytes
    fn decode_action(buf: &[u8]) -> Result<Self::Action, DecodeError>;

    /// Encode observation to bytes
    fn encode_obs(obs: &Self::Obs, out: &mut Vec<u8>) -> Result<(), EncodeError>;
}

/// Error returned by [`Game::step`]
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Episode already finished: {0}")]
    Finished(String),
}

/// Error type for encoding operations
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Error type for decoding operations
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid buffer length: expected {expected} but got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}
