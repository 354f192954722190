use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Parser, Debug, Clone, Serialize)]
#[command(name = "actor")]
#[command(about = "Dustbiters self-play actor")]
#[command(long_about = "Actor that plays seeded episodes of a registered environment.

Episode i is reset with seed + i, so a run is reproducible from its
configuration alone. Transitions are buffered and flushed in batches.")]
pub struct Config {
    /// TOML file whose values replace defaults not given on the command line or in the environment
    #[arg(long, env = "ACTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Unique actor identifier
    #[arg(long, env = "ACTOR_ACTOR_ID", default_value = "actor-1")]
    pub actor_id: String,

    /// Environment ID to run
    #[arg(long, env = "ACTOR_ENV_ID", default_value = "dustbiters")]
    pub env_id: String,

    /// Number of episodes to play
    #[arg(long, env = "ACTOR_EPISODES", default_value = "100")]
    pub episodes: u32,

    /// Base seed; episode i uses seed + i
    #[arg(long, env = "ACTOR_SEED", default_value = "0")]
    pub seed: u64,

    /// Steps after which an unfinished episode is truncated
    #[arg(long, env = "ACTOR_MAX_STEPS", default_value = "256")]
    pub max_steps: u32,

    /// Transitions per flushed batch
    #[arg(long, env = "ACTOR_BATCH_SIZE", default_value = "32")]
    pub batch_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ACTOR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Contents of a `--config` file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    actor_id: Option<String>,
    env_id: Option<String>,
    episodes: Option<u32>,
    seed: Option<u64>,
    max_steps: Option<u32>,
    batch_size: Option<usize>,
    log_level: Option<String>,
}

impl Config {
    /// Parse the process arguments and environment, then apply the config file
    pub fn load() -> Result<Self> {
        Self::load_from(std::env::args_os())
    }

    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut config = Self::from_arg_matches(&matches)?;

        if let Some(path) = config.config.clone() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let file: FileConfig = toml::from_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            config.apply_file(file, &matches);
        }
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig, matches: &ArgMatches) {
        let defaulted = |id: &str| matches.value_source(id) == Some(ValueSource::DefaultValue);

        fn fill<T>(slot: &mut T, value: Option<T>, defaulted: bool) {
            if let (Some(value), true) = (value, defaulted) {
                *slot = value;
            }
        }

        fill(&mut self.actor_id, file.actor_id, defaulted("actor_id"));
        fill(&mut self.env_id, file.env_id, defaulted("env_id"));
        fill(&mut self.episodes, file.episodes, defaulted("episodes"));
        fill(&mut self.seed, file.seed, defaulted("seed"));
        fill(&mut self.max_steps, file.max_steps, defaulted("max_steps"));
        fill(&mut self.batch_size, file.batch_size, defaulted("batch_size"));
        fill(&mut self.log_level, file.log_level, defaulted("log_level"));
    }

    pub fn validate(&self) -> Result<()> {
        if self.actor_id.is_empty() {
            return Err(anyhow!("actor_id cannot be empty"));
        }

        if self.env_id.is_empty() {
            return Err(anyhow!("env_id cannot be empty"));
        }

        if self.episodes == 0 {
            return Err(anyhow!("episodes must be greater than 0"));
        }

        if self.max_steps == 0 {
            return Err(anyhow!("max_steps must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow!("unknown log level '{}'", self.log_level))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        config: None,
        actor_id: "test-actor".into(),
        env_id: games_dustbiters::ENV_ID.into(),
        episodes: 3,
        seed: 7,
        max_steps: 256,
        batch_size: 4,
        log_level: "info".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::load_from(["actor"]).unwrap();
        assert_eq!(config.env_id, "dustbiters");
        assert_eq!(config.episodes, 100);
        assert_eq!(config.max_steps, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let mut config = test_config();
        config.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.episodes = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.actor_id.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = test_config();
        config.log_level = "loud".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("loud"));

        config.log_level = "debug".into();
        assert_eq!(config.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_file_fills_defaults_but_not_flags() {
        let path = std::env::temp_dir().join(format!("actor-config-{}.toml", std::process::id()));
        fs::write(&path, "episodes = 12\nseed = 99\nbatch_size = 8\n").unwrap();

        let config = Config::load_from([
            "actor".to_string(),
            "--config".to_string(),
            path.display().to_string(),
            "--seed".to_string(),
            "5".to_string(),
        ])
        .unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.episodes, 12);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.seed, 5);
    }

    #[test]
    fn test_file_with_unknown_key_is_rejected() {
        let path = std::env::temp_dir().join(format!("actor-bad-{}.toml", std::process::id()));
        fs::write(&path, "engine_addr = \"http://localhost\"\n").unwrap();

        let result = Config::load_from(["actor".to_string(), "--config".to_string(), path.display().to_string()]);
        fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("parsing config file"));
    }
}
