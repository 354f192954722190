//! Fixed-shape interface for automated agents
//!
//! Agents pick an index in `[0, MAX_ACTIONS)` into the current legal-move
//! list and see a 66-slot integer vector. Indices past the end of the list,
//! negative or not, resolve to [`FALLBACK_ACTION`] instead of failing, and
//! earn [`INVALID_ACTION_PENALTY`] unless the forced end finishes the game.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::action::Action;
use crate::card::{Card, CARD_COUNT};
use crate::engine::{EngineError, GameEngine, INVALID_ACTION_PENALTY};
use crate::state::Observation;

/// Size of the discrete action space
pub const MAX_ACTIONS: usize = 50;

/// Convoy, two hands, then turn, budget and deck size
pub const OBS_LEN: usize = CARD_COUNT * 3 + 3;

/// Value of unused card slots
pub const EMPTY_SLOT: i32 = -1;

/// Substitute for indices that do not name a legal move
///
/// `End` is always the last legal move, so this is also "the last listed
/// action".
pub const FALLBACK_ACTION: Action = Action::End;

pub type EncodedObservation = [i32; OBS_LEN];

/// An index mapped onto a concrete move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub action: Action,
    pub fallback: bool,
}

/// Per-step details beyond reward and termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    pub action: Action,
    pub fallback: bool,
    pub valid: bool,
    pub destroyed: Option<Card>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterStep {
    pub observation: EncodedObservation,
    pub reward: f32,
    pub done: bool,
    /// Always false; the engine has no step limit of its own
    pub truncated: bool,
    pub info: StepInfo,
}

/// Map `index` into `legal`, falling back for anything outside it
pub fn resolve_action(index: i64, legal: &[Action]) -> Resolution {
    let listed = usize::try_from(index)
        .ok()
        .filter(|&i| i < MAX_ACTIONS)
        .and_then(|i| legal.get(i));
    match listed {
        Some(&action) => Resolution { action, fallback: false },
        None => Resolution { action: FALLBACK_ACTION, fallback: true },
    }
}

pub fn encode_observation(obs: &Observation) -> EncodedObservation {
    let mut out = [EMPTY_SLOT; OBS_LEN];
    let (cards, meta) = out.split_at_mut(CARD_COUNT * 3);
    for (slots, zone) in cards
        .chunks_exact_mut(CARD_COUNT)
        .zip([&obs.convoy, &obs.hands[0], &obs.hands[1]])
    {
        for (slot, card) in slots.iter_mut().zip(zone) {
            *slot = i32::from(card.code());
        }
    }
    meta[0] = i32::from(u8::from(obs.turn));
    meta[1] = i32::from(obs.actions_left);
    meta[2] = i32::try_from(obs.deck_size).unwrap_or(i32::MAX);
    out
}

/// Resolve `index` against the engine's current legal moves and apply it
///
/// A fallback step is penalised like an invalid move; if the forced end
/// decides the game, the terminal reward stands instead.
pub fn step_index(engine: &mut GameEngine, index: i64) -> Result<AdapterStep, EngineError> {
    let legal = engine.legal_actions();
    let resolution = resolve_action(index, &legal);
    if resolution.fallback {
        debug!(index, legal = legal.len(), "index outside legal moves, ending turn");
    }

    let result = engine.step(resolution.action)?;
    let reward = if resolution.fallback && !result.done {
        INVALID_ACTION_PENALTY
    } else {
        result.reward
    };
    Ok(AdapterStep {
        observation: encode_observation(&result.observation),
        reward,
        done: result.done,
        truncated: false,
        info: StepInfo {
            action: resolution.action,
            fallback: resolution.fallback,
            valid: result.valid,
            destroyed: result.destroyed,
        },
    })
}

/// A [`GameEngine`] paired with the generator it deals from
///
/// `new(seed)` deals the first game immediately, identical to what
/// `reset_with_seed(seed)` would deal; `reset` continues the same stream.
#[derive(Debug, Clone)]
pub struct LearningAdapter {
    engine: GameEngine,
    rng: ChaCha20Rng,
}

impl LearningAdapter {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let engine = GameEngine::new(&mut rng);
        Self { engine, rng }
    }

    pub fn reset(&mut self) -> EncodedObservation {
        encode_observation(&self.engine.reset(&mut self.rng))
    }

    pub fn reset_with_seed(&mut self, seed: u64) -> EncodedObservation {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self.reset()
    }

    pub fn observation(&self) -> EncodedObservation {
        encode_observation(&self.engine.observation())
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        self.engine.legal_actions()
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// # Errors
    ///
    /// Returns [`EngineError::GameFinished`] once the game is over.
    pub fn step(&mut self, index: i64) -> Result<AdapterStep, EngineError> {
        step_index(&mut self.engine, index)
    }
}
