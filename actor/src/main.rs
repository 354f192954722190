use anyhow::Result;
use tracing::{debug, error, info};

mod actor;
mod config;
mod policy;

use crate::actor::{Actor, CountingSink};
use crate::config::Config;

fn main() -> Result<()> {
    // Parse and validate configuration before logging is up
    let config = Config::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .init();

    games_dustbiters::register();

    info!(
        "Starting actor {} for environment {}",
        config.actor_id, config.env_id
    );
    debug!(effective = %toml::to_string(&config)?, "configuration");

    let mut actor = Actor::new(config, CountingSink::default())?;

    match actor.run() {
        Ok(stats) => {
            info!(
                transitions = actor.sink().transitions,
                batches = actor.sink().batches,
                bytes = actor.sink().bytes,
                episodes = stats.episodes,
                "Actor completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!("Actor failed: {:#}", e);
            Err(e)
        }
    }
}
