//! Runtime configuration structures and loaders.
use std::env;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;

use horde_core::WorldRules;

use crate::api::{Result, RuntimeError};

/// Runtime configuration shared across the worker and the scheduler.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub rules: WorldRules,
    /// Time of day (UTC) the horde attacks.
    pub resolution_time: NaiveTime,
    /// Time of day (UTC) the next day begins.
    pub dawn_time: NaiveTime,
    /// Period of the contested-zone sweep.
    pub sweep_interval: Duration,
    pub command_buffer_size: usize,
    pub event_buffer_size: usize,
    /// Key the serialized world state is cached under.
    pub world_state_key: String,
    /// Seed for the worker's random source. Entropy when unset.
    pub rng_seed: Option<u64>,
}

impl RuntimeConfig {
    pub const DEFAULT_WORLD_STATE_KEY: &'static str = "world_state";

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `HORDE_RESOLUTION_TIME` - Attack time of day, `HH:MM[:SS]` UTC (default: 23:00)
    /// - `HORDE_DAWN_TIME` - Dawn time of day, `HH:MM[:SS]` UTC (default: 00:00)
    /// - `HORDE_SWEEP_INTERVAL_SECS` - Contested-zone sweep period (default: 60)
    /// - `HORDE_COMMAND_BUFFER` - World worker queue size (default: 32)
    /// - `HORDE_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    /// - `HORDE_WORLD_STATE_KEY` - Cache key for the world state (default: world_state)
    /// - `HORDE_RULES_FILE` - RON file with world rules (default: built-in rules)
    /// - `HORDE_RNG_SEED` - Fixed seed for reproducible runs (default: entropy)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = env::var("HORDE_RESOLUTION_TIME").ok() {
            config.resolution_time = parse_time_of_day("HORDE_RESOLUTION_TIME", &raw)?;
        }
        if let Some(raw) = env::var("HORDE_DAWN_TIME").ok() {
            config.dawn_time = parse_time_of_day("HORDE_DAWN_TIME", &raw)?;
        }

        if let Some(secs) = read_env::<u64>("HORDE_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(capacity) = read_env::<usize>("HORDE_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("HORDE_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Ok(key) = env::var("HORDE_WORLD_STATE_KEY")
            && !key.is_empty()
        {
            config.world_state_key = key;
        }

        if let Ok(path) = env::var("HORDE_RULES_FILE") {
            config.rules = load_rules(path)?;
        }

        config.rng_seed = read_env::<u64>("HORDE_RNG_SEED");

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the scheduler or the rules cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.resolution_time == self.dawn_time {
            return Err(RuntimeError::Config(format!(
                "resolution time and dawn time must differ (both {})",
                self.resolution_time
            )));
        }
        if self.sweep_interval.is_zero() {
            return Err(RuntimeError::Config(
                "sweep interval must be positive".to_owned(),
            ));
        }
        self.rules.validate()?;
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rules: WorldRules::default(),
            resolution_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default(),
            dawn_time: NaiveTime::default(),
            sweep_interval: Duration::from_secs(60),
            command_buffer_size: 32,
            event_buffer_size: 100,
            world_state_key: Self::DEFAULT_WORLD_STATE_KEY.to_owned(),
            rng_seed: None,
        }
    }
}

/// Reads world rules from a RON file. Missing fields take their defaults.
pub fn load_rules(path: impl AsRef<Path>) -> Result<WorldRules> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| RuntimeError::Config(format!("failed to read {}: {e}", path.display())))?;
    parse_rules(&source)
        .map_err(|e| RuntimeError::Config(format!("failed to parse {}: {e}", path.display())))
}

fn parse_rules(source: &str) -> std::result::Result<WorldRules, ron::error::SpannedError> {
    ron::from_str(source)
}

fn parse_time_of_day(key: &str, raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| RuntimeError::Config(format!("{key}: invalid time of day '{raw}': {e}")))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
