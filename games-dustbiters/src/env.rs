//! Dustbiters behind the shared environment contract

use engine_core::typed::{
    ActionSpace, Capabilities, DecodeError, EncodeError, EngineId, Encoding, Game, GameError,
};
use rand_chacha::ChaCha20Rng;

use crate::codec;
use crate::engine::GameEngine;
use crate::learning::{encode_observation, step_index, EncodedObservation, MAX_ACTIONS, OBS_LEN};

/// Registry key
pub const ENV_ID: &str = "dustbiters";

/// Step cap advertised to harnesses
pub const MAX_HORIZON: u32 = 256;

/// Stateless [`Game`] implementation; all game data travels in [`GameEngine`]
#[derive(Debug, Default)]
pub struct Dustbiters;

impl Game for Dustbiters {
    type State = GameEngine;
    type Action = u32;
    type Obs = EncodedObservation;

    fn engine_id(&self) -> EngineId {
        EngineId {
            env_id: ENV_ID.to_string(),
            build_id: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            id: self.engine_id(),
            encoding: Encoding {
                state: "dustbiters_state:v1".to_string(),
                action: "action_index_u32:v1".to_string(),
                obs: format!("i32x{OBS_LEN}:v1"),
                schema_version: u32::from(codec::STATE_VERSION),
            },
            max_horizon: MAX_HORIZON,
            action_space: ActionSpace::Discrete(MAX_ACTIONS as u32),
            obs_len: OBS_LEN as u32,
            preferred_batch: 64,
        }
    }

    fn reset(&mut self, rng: &mut ChaCha20Rng, _hint: &[u8]) -> (Self::State, Self::Obs) {
        let engine = GameEngine::new(rng);
        let obs = encode_observation(&engine.observation());
        (engine, obs)
    }

    fn step(
        &mut self,
        state: &mut Self::State,
        action: Self::Action,
        _rng: &mut ChaCha20Rng,
    ) -> Result<(Self::Obs, f32, bool), GameError> {
        let step = step_index(state, i64::from(action))
            .map_err(|e| GameError::Finished(e.to_string()))?;
        Ok((step.observation, step.reward, step.done))
    }

    fn encode_state(state: &Self::State, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        codec::encode_state(state.state(), out);
        Ok(())
    }

    fn decode_state(buf: &[u8]) -> Result<Self::State, DecodeError> {
        codec::decode_state(buf).map(GameEngine::from_state)
    }

    fn encode_action(action: &Self::Action, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.extend_from_slice(&action.to_le_bytes());
        Ok(())
    }

    fn decode_action(buf: &[u8]) -> Result<Self::Action, DecodeError> {
        let bytes: [u8; 4] = buf.try_into().map_err(|_| DecodeError::InvalidLength {
            expected: 4,
            actual: buf.len(),
        })?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn encode_obs(obs: &Self::Obs, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        out.reserve(obs.len() * 4);
        for value in obs {
            out.extend_from_slice(&value.to_le_bytes());
        }
        Ok(())
    }
}

/// Register Dustbiters with the global game registry
pub fn register() {
    engine_core::register_game!(Dustbiters, ENV_ID);
}
