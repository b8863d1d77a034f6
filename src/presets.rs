//! Named poll settings for the two verification styles seen in practice.
//!
//! - [`responsive`]: 10 attempts, 500 ms apart. For checks where the value is expected
//!   almost immediately and a quick failure is preferred.
//! - [`standard`]: 10 attempts, 1000 ms apart. Lighter on the store, still well inside a
//!   one-minute TTL.
//!
//! ```rust
//! use freshpoll::{presets, RetrievalRequest};
//!
//! let request = RetrievalRequest::by_key("org:acme:sync", "token").with_config(&presets::responsive());
//! assert_eq!(request.effective_attempts(), 10);
//! ```

use crate::config::PollConfig;
use crate::request::DEFAULT_MAX_ATTEMPTS;

const RESPONSIVE_INTERVAL_MILLIS: u64 = 500;
const STANDARD_INTERVAL_MILLIS: u64 = 1000;

/// 10 attempts, 500 ms apart.
pub fn responsive() -> PollConfig {
    PollConfig {
        max_attempts: Some(i64::from(DEFAULT_MAX_ATTEMPTS)),
        interval_millis: RESPONSIVE_INTERVAL_MILLIS,
    }
}

/// 10 attempts, 1000 ms apart.
pub fn standard() -> PollConfig {
    PollConfig {
        max_attempts: Some(i64::from(DEFAULT_MAX_ATTEMPTS)),
        interval_millis: STANDARD_INTERVAL_MILLIS,
    }
}
