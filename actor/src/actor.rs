use anyhow::{anyhow, Context, Result};
use engine_core::{create_game, list_registered_games, ErasedGame};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::policy::{Policy, RandomPolicy};

/// One environment step as seen by the acting policy
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub episode_id: String,
    pub step_number: u32,
    pub state: Vec<u8>,
    pub action: Vec<u8>,
    pub next_state: Vec<u8>,
    pub observation: Vec<u8>,
    pub next_observation: Vec<u8>,
    pub reward: f32,
    pub done: bool,
    /// Cut off by `max_steps` before the game finished
    pub truncated: bool,
}

impl Transition {
    /// Size of the encoded buffers carried by this transition
    pub fn payload_bytes(&self) -> usize {
        self.state.len()
            + self.action.len()
            + self.next_state.len()
            + self.observation.len()
            + self.next_observation.len()
    }
}

/// Destination for flushed transition batches
pub trait TransitionSink {
    fn store_batch(&mut self, transitions: Vec<Transition>) -> Result<()>;
}

/// Sink that only keeps totals
#[derive(Debug, Default)]
pub struct CountingSink {
    pub batches: usize,
    pub transitions: usize,
    pub bytes: usize,
}

impl TransitionSink for CountingSink {
    fn store_batch(&mut self, transitions: Vec<Transition>) -> Result<()> {
        self.batches += 1;
        self.transitions += transitions.len();
        self.bytes += transitions.iter().map(Transition::payload_bytes).sum::<usize>();
        debug!(
            batch = transitions.len(),
            total = self.transitions,
            episodes_ended = transitions.iter().filter(|t| t.done || t.truncated).count(),
            reward = transitions.iter().map(|t| t.reward).sum::<f32>(),
            last_episode = transitions.last().map(|t| t.episode_id.as_str()).unwrap_or(""),
            "stored transition batch"
        );
        Ok(())
    }
}

/// Episode totals; outcomes are judged by the final reward to the last mover
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub episodes: u32,
    pub steps: u64,
    pub mover_wins: u32,
    pub mover_losses: u32,
    pub draws: u32,
    pub truncated: u32,
    pub failed: u32,
}

impl RunStats {
    fn record(&mut self, steps: u32, final_reward: f32, done: bool) {
        self.episodes += 1;
        self.steps += u64::from(steps);
        if !done {
            self.truncated += 1;
        } else if final_reward > 0.0 {
            self.mover_wins += 1;
        } else if final_reward < 0.0 {
            self.mover_losses += 1;
        } else {
            self.draws += 1;
        }
    }

    pub fn mean_length(&self) -> f64 {
        if self.episodes == 0 {
            return 0.0;
        }
        self.steps as f64 / f64::from(self.episodes)
    }
}

pub struct Actor<S: TransitionSink> {
    config: Config,
    game: Box<dyn ErasedGame>,
    policy: Box<dyn Policy>,
    sink: S,
    transition_buffer: Vec<Transition>,
    stats: RunStats,
}

impl<S: TransitionSink> Actor<S> {
    /// Create the configured environment from the registry and a seeded random policy
    pub fn new(config: Config, sink: S) -> Result<Self> {
        let game = create_game(&config.env_id).ok_or_else(|| {
            anyhow!(
                "environment '{}' is not registered (known: {:?})",
                config.env_id,
                list_registered_games()
            )
        })?;

        let capabilities = game.capabilities();
        let policy = RandomPolicy::with_seed(&capabilities, config.seed)
            .context("failed to create policy")?;

        info!(
            actor_id = %config.actor_id,
            env_id = %config.env_id,
            max_horizon = capabilities.max_horizon,
            actions = capabilities.action_space.size(),
            "actor initialized"
        );

        Ok(Self::with_parts(config, game, Box::new(policy), sink))
    }

    pub fn with_parts(
        config: Config,
        game: Box<dyn ErasedGame>,
        policy: Box<dyn Policy>,
        sink: S,
    ) -> Self {
        Self {
            config,
            game,
            policy,
            sink,
            transition_buffer: Vec::new(),
            stats: RunStats::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Play every configured episode, flush what is left and return the totals
    pub fn run(&mut self) -> Result<RunStats> {
        info!(actor_id = %self.config.actor_id, episodes = self.config.episodes, "starting run");

        for episode in 0..self.config.episodes {
            let seed = self.config.seed.wrapping_add(u64::from(episode));
            if let Err(e) = self.run_episode(episode, seed) {
                // Continue with next episode rather than stopping
                error!(episode, seed, "episode failed: {e:#}");
                self.stats.failed += 1;
            }
            if (episode + 1) % 10 == 0 {
                info!("Completed {} episodes", episode + 1);
            }
        }

        self.flush_buffer()?;

        let stats = &self.stats;
        info!(
            episodes = stats.episodes,
            mean_length = stats.mean_length(),
            mover_wins = stats.mover_wins,
            mover_losses = stats.mover_losses,
            draws = stats.draws,
            truncated = stats.truncated,
            failed = stats.failed,
            "run finished"
        );
        Ok(self.stats.clone())
    }

    fn run_episode(&mut self, episode: u32, seed: u64) -> Result<()> {
        let episode_id = format!("{}-ep-{}", self.config.actor_id, episode);

        let mut state = Vec::new();
        let mut obs = Vec::new();
        self.game
            .reset(seed, &[], &mut state, &mut obs)
            .with_context(|| format!("failed to reset {episode_id}"))?;
        debug!(%episode_id, seed, "started episode");

        let mut next_state = Vec::new();
        let mut next_obs = Vec::new();
        let mut step_number = 0u32;

        loop {
            let action = self
                .policy
                .select_action(&obs)
                .context("failed to select action")?;

            let (reward, done) = self
                .game
                .step(&state, &action, &mut next_state, &mut next_obs)
                .with_context(|| format!("failed to step {episode_id} at step {step_number}"))?;
            let truncated = !done && step_number + 1 >= self.config.max_steps;

            self.transition_buffer.push(Transition {
                episode_id: episode_id.clone(),
                step_number,
                state: state.clone(),
                action,
                next_state: next_state.clone(),
                observation: obs.clone(),
                next_observation: next_obs.clone(),
                reward,
                done,
                truncated,
            });
            if self.transition_buffer.len() >= self.config.batch_size {
                self.flush_buffer()?;
            }

            step_number += 1;
            if done || truncated {
                debug!(
                    %episode_id,
                    steps = step_number,
                    final_reward = reward,
                    truncated,
                    "episode completed"
                );
                self.stats.record(step_number, reward, done);
                return Ok(());
            }

            std::mem::swap(&mut state, &mut next_state);
            std::mem::swap(&mut obs, &mut next_obs);
        }
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.transition_buffer.is_empty() {
            return Ok(());
        }
        let transitions = std::mem::take(&mut self.transition_buffer);
        debug!("Flushing {} transitions", transitions.len());
        self.sink
            .store_batch(transitions)
            .context("failed to store batch")
    }
}
