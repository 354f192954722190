//! Fixture game shared by the unit tests of this crate

use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::typed::{
    ActionSpace, Capabilities, DecodeError, EncodeError, EngineId, Encoding, Game, GameError,
};

/// Counts down from a random start; action `a` subtracts `1 + a`
#[derive(Debug, Default)]
pub(crate) struct Countdown {
    pub(crate) name: String,
    pub(crate) steps: u32,
}

impl Countdown {
    pub(crate) fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: 0,
        }
    }
}

impl Game for Countdown {
    type State = u32;
    type Action = u8;
    type Obs = Vec<f32>;

    fn engine_id(&self) -> EngineId {
        let env_id = if self.name.is_empty() {
            "countdown".to_string()
        } else {
            self.name.clone()
        };
        EngineId {
            env_id,
            build_id: "0.1.0".to_string(),
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            id: self.engine_id(),
            encoding: Encoding {
                state: "u32:v1".to_string(),
                action: "u8:v1".to_string(),
                obs: "f32x1:v1".to_string(),
                schema_version: 1,
            },
            max_horizon: 20,
            action_space: ActionSpace::Discrete(3),
            obs_len: 1,
            preferred_batch: 8,
        }
    }

    fn reset(&mut self, rng: &mut ChaCha20Rng, _hint: &[u8]) -> (Self::State, Self::Obs) {
        self.steps = 0;
        let start = rng.gen_range(5..20u32);
        (start, vec![start as f32])
    }

    fn step(
        &mut self,
        state: &mut Self::State,
        action: Self::Action,
        _rng: &mut ChaCha20Rng,
    ) -> Result<(Self::Obs, f32, bool), GameError> {
        if *state == 0 {
            return Err(GameError::Finished("countdown already at zero".to_string()));
        }
        self.steps += 1;
        *state = state.saturating_sub(1 + u32::from(action));
        let done = *state == 0;
        let reward = if done { 1.0 } else { 0.0 };
        Ok((vec![*state as f32], reward, done))
    }

    fn encode_state(state: &Self::State, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.extend_from_slice(&state.to_le_bytes());
        Ok(())
    }

    fn decode_state(buf: &[u8]) -> Result<Self::State, DecodeError> {
        let bytes: [u8; 4] = buf.try_into().map_err(|_| DecodeError::InvalidLength {
            expected: 4,
            actual: buf.len(),
        })?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn encode_action(action: &Self::Action, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.push(*action);
        Ok(())
    }

    fn decode_action(buf: &[u8]) -> Result<Self::Action, DecodeError> {
        match buf {
            [a] if *a < 3 => Ok(*a),
            [a] => Err(DecodeError::CorruptedData(format!("Action {} outside 0..3", a))),
            _ => Err(DecodeError::InvalidLength {
                expected: 1,
                actual: buf.len(),
            }),
        }
    }

    fn encode_obs(obs: &Self::Obs, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        for &value in obs {
            out.extend_from_slice(&value.to_le_bytes());
        }
        Ok(())
    }
}
