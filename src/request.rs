//! Request descriptors for a single polling retrieval.
//!
//! A [`RetrievalRequest`] names what to fetch ([`Identifier`]), carries the caller's
//! [`AccessToken`], and fixes the attempt budget and inter-attempt interval for one call.
//!
//! ```rust
//! use std::time::Duration;
//! use freshpoll::{Identifier, RetrievalRequest};
//!
//! let request = RetrievalRequest::by_type_and_id("identity", "2c91808", "secret")
//!     .max_attempts(5)
//!     .interval(Duration::from_millis(500));
//! assert_eq!(request.effective_attempts(), 5);
//! assert!(matches!(request.identifier(), Identifier::ByTypeAndId { .. }));
//! ```

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use crate::config::PollConfig;

/// Attempt budget used when none (or a non-positive one) is supplied.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Interval used when a request does not set one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// How a stored entry is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// A single opaque key.
    ByKey { key: String },
    /// A composite `(type, id)` pair.
    ByTypeAndId { kind: String, id: String },
}

impl Identifier {
    pub fn key(key: impl Into<String>) -> Self {
        Identifier::ByKey { key: key.into() }
    }

    pub fn type_and_id(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Identifier::ByTypeAndId { kind: kind.into(), id: id.into() }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::ByKey { key } => write!(f, "key={}", key),
            Identifier::ByTypeAndId { kind, id } => write!(f, "type={} id={}", kind, id),
        }
    }
}

/// Opaque credential forwarded verbatim to the lookup service.
///
/// `Debug` is redacted so tokens never end up in logs or panic messages.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for handing to the transport.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Describes one retrieval: what to fetch, with which credential, and how hard to try.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    identifier: Identifier,
    token: AccessToken,
    max_attempts: Option<i64>,
    interval: Duration,
}

impl RetrievalRequest {
    pub fn new(identifier: Identifier, token: impl Into<AccessToken>) -> Self {
        Self { identifier, token: token.into(), max_attempts: None, interval: DEFAULT_INTERVAL }
    }

    /// Request addressed by a single key.
    pub fn by_key(key: impl Into<String>, token: impl Into<AccessToken>) -> Self {
        Self::new(Identifier::key(key), token)
    }

    /// Request addressed by a `(type, id)` pair.
    pub fn by_type_and_id(
        kind: impl Into<String>,
        id: impl Into<String>,
        token: impl Into<AccessToken>,
    ) -> Self {
        Self::new(Identifier::type_and_id(kind, id), token)
    }

    /// Set the attempt budget. Zero or negative values fall back to
    /// [`DEFAULT_MAX_ATTEMPTS`].
    pub fn max_attempts(mut self, attempts: i64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the wait between attempts. Zero polls back-to-back.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Apply budget and interval from a [`PollConfig`].
    #[cfg(feature = "config")]
    pub fn with_config(mut self, config: &PollConfig) -> Self {
        self.max_attempts = config.max_attempts;
        self.interval = config.interval();
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// The budget the retriever will actually use: always at least one attempt.
    pub fn effective_attempts(&self) -> u32 {
        coerce_attempts(self.max_attempts)
    }

    pub fn interval_duration(&self) -> Duration {
        self.interval
    }
}

pub(crate) fn coerce_attempts(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => DEFAULT_MAX_ATTEMPTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_budget_defaults_to_ten() {
        let request = RetrievalRequest::by_key("k", "t");
        assert_eq!(request.effective_attempts(), 10);
    }

    #[test]
    fn non_positive_budget_defaults_to_ten() {
        for n in [0, -1, i64::MIN] {
            let request = RetrievalRequest::by_key("k", "t").max_attempts(n);
            assert_eq!(request.effective_attempts(), DEFAULT_MAX_ATTEMPTS, "input {}", n);
        }
    }

    #[test]
    fn positive_budget_is_kept() {
        assert_eq!(RetrievalRequest::by_key("k", "t").max_attempts(1).effective_attempts(), 1);
        assert_eq!(RetrievalRequest::by_key("k", "t").max_attempts(37).effective_attempts(), 37);
    }

    #[test]
    fn huge_budget_saturates() {
        let request = RetrievalRequest::by_key("k", "t").max_attempts(i64::MAX);
        assert_eq!(request.effective_attempts(), u32::MAX);
    }

    #[test]
    fn zero_interval_is_kept() {
        let request = RetrievalRequest::by_key("k", "t").interval(Duration::ZERO);
        assert_eq!(request.interval_duration(), Duration::ZERO);
    }

    #[test]
    fn token_debug_is_redacted() {
        let request = RetrievalRequest::by_key("k", "super-secret");
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(request.token().expose(), "super-secret");
    }

    #[test]
    fn identifier_display() {
        assert_eq!(Identifier::key("abc").to_string(), "key=abc");
        assert_eq!(Identifier::type_and_id("identity", "42").to_string(), "type=identity id=42");
    }
}
