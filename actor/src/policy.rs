use anyhow::{bail, Result};
use engine_core::{ActionSpace, Capabilities};
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;

/// Trait for action selection policies
pub trait Policy: Send {
    /// Select an encoded action given an encoded observation
    fn select_action(&mut self, observation: &[u8]) -> Result<Vec<u8>>;
}

/// Random policy that selects actions uniformly at random
pub struct RandomPolicy {
    rng: ChaCha20Rng,
    action_space: ActionSpace,
}

impl RandomPolicy {
    pub fn with_seed(capabilities: &Capabilities, seed: u64) -> Result<Self> {
        if capabilities.action_space.size() == 0 {
            bail!(
                "{} advertises an empty action space",
                capabilities.id.env_id
            );
        }
        Ok(Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            action_space: capabilities.action_space,
        })
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, _observation: &[u8]) -> Result<Vec<u8>> {
        match self.action_space {
            ActionSpace::Discrete(n) => {
                let action = self.rng.gen_range(0..n);
                Ok(action.to_le_bytes().to_vec())
            }
        }
    }
}
