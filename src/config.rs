//! Simulation configuration.
//!
//! Defaults reproduce the classic game: two players, a frustration limit of
//! three, 140 ms of think time after a successful claim, and a board print
//! every 500 ms. Every value can be overridden from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::board::MAX_PLAYERS;

/// Errors in configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("player count must be between 1 and {max}, got {got}")]
    PlayerCount { got: usize, max: usize },

    #[error("frustration limit must be at least 1")]
    FrustrationLimit,
}

/// Configuration for one simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of player agents.
    pub players: usize,
    /// Consecutive illegal attempts after which an agent gives up.
    pub frustration_limit: u32,
    /// Pause after a legal move.
    pub think_time: Duration,
    /// Interval between supervisor board prints.
    pub display_interval: Duration,
    /// How long the event injector waits for an event before re-checking
    /// the termination flag.
    pub event_poll: Duration,
    /// Time a move keeps its lock set after changing the owner and before
    /// updating the score. Zero in normal play.
    pub move_hold: Duration,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Where to write the JSON report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            players: 2,
            frustration_limit: 3,
            think_time: Duration::from_millis(140),
            display_interval: Duration::from_millis(500),
            event_poll: Duration::from_millis(50),
            move_hold: Duration::ZERO,
            seed: 0,
            report_path: None,
        }
    }
}

impl SimConfig {
    /// Loads the defaults with environment overrides applied.
    ///
    /// Optional variables:
    /// - `TERRITORY_PLAYERS` -- number of players (default 2)
    /// - `TERRITORY_FRUSTRATION_LIMIT` -- illegal attempts before giving up (default 3)
    /// - `TERRITORY_THINK_MS` -- pause after a legal move (default 140)
    /// - `TERRITORY_SHOW_MS` -- board print interval (default 500)
    /// - `TERRITORY_SEED` -- random seed, 0 for entropy (default 0)
    /// - `TERRITORY_REPORT` -- path of a JSON report written on completion
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`SimConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = SimConfig::default();

        if let Some(v) = parse_var(&lookup, "TERRITORY_PLAYERS")? {
            config.players = v;
        }
        if let Some(v) = parse_var(&lookup, "TERRITORY_FRUSTRATION_LIMIT")? {
            config.frustration_limit = v;
        }
        if let Some(ms) = parse_var(&lookup, "TERRITORY_THINK_MS")? {
            config.think_time = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var(&lookup, "TERRITORY_SHOW_MS")? {
            config.display_interval = Duration::from_millis(ms);
        }
        if let Some(v) = parse_var(&lookup, "TERRITORY_SEED")? {
            config.seed = v;
        }
        if let Some(path) = lookup("TERRITORY_REPORT").filter(|p| !p.is_empty()) {
            config.report_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount {
                got: self.players,
                max: MAX_PLAYERS,
            });
        }
        if self.frustration_limit == 0 {
            return Err(ConfigError::FrustrationLimit);
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
