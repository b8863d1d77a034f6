//! Poll configuration.
//!
//! `PollConfig` carries the two knobs of a retrieval: the attempt budget and the fixed
//! interval between attempts. It deserializes from JSON so test suites can keep their
//! polling settings next to the rest of their environment configuration.
//!
//! ```rust
//! use std::time::Duration;
//! use freshpoll::PollConfig;
//!
//! let config = PollConfig::from_json(r#"{ "max_attempts": 4, "interval_millis": 500 }"#).unwrap();
//! assert_eq!(config.effective_attempts(), 4);
//! assert_eq!(config.interval(), Duration::from_millis(500));
//! ```

use crate::error::ConfigError;
use crate::request::{coerce_attempts, DEFAULT_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted interval (1 hour). Entries in the target stores live for about a
/// minute, so anything longer can never observe a value.
pub const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Attempt budget and interval for a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    /// Total attempts. `None`, zero and negative values mean the default of 10.
    pub max_attempts: Option<i64>,
    /// Wait between attempts in milliseconds.
    pub interval_millis: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { max_attempts: None, interval_millis: DEFAULT_INTERVAL.as_millis() as u64 }
    }
}

impl PollConfig {
    pub fn new(max_attempts: i64, interval: Duration) -> Result<Self, ConfigError> {
        let config = Self {
            max_attempts: Some(max_attempts),
            interval_millis: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: PollConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.interval();
        if interval > MAX_INTERVAL {
            return Err(ConfigError::IntervalTooLong { interval, max: MAX_INTERVAL });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }

    pub fn effective_attempts(&self) -> u32 {
        coerce_attempts(self.max_attempts)
    }
}
