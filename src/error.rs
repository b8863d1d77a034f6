//! Error types for polling retrievals.
//!
//! Only two conditions cross the retriever boundary as errors: a failure raised by the
//! lookup service itself, and cancellation by the caller. A value that never became
//! visible is not an error; it is reported as [`Retrieval::NotFound`](crate::Retrieval).
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`PollingRetriever`](crate::PollingRetriever).
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The lookup service raised an error. Never retried.
    #[error("lookup failed on attempt {attempt}: {source}")]
    Lookup {
        /// 1-indexed attempt on which the failure happened.
        attempt: u32,
        #[source]
        source: E,
    },
    /// The caller's cancellation token fired before the retrieval finished.
    #[error("retrieval cancelled after {attempts} completed attempts")]
    Cancelled { attempts: u32 },
}

impl<E> PollError<E> {
    /// Check if this error is a lookup failure.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }

    /// Check if this error is due to cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Attempt count carried by the error.
    ///
    /// For a lookup failure this is the attempt that failed. For cancellation it is the
    /// number of attempts whose outcome had been observed; a lookup still in flight when
    /// the token fired is not counted.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Lookup { attempt, .. } => *attempt,
            Self::Cancelled { attempts } => *attempts,
        }
    }

    /// Borrow the lookup error if present.
    pub fn as_lookup_error(&self) -> Option<&E> {
        match self {
            Self::Lookup { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    /// Extract the lookup error if present.
    pub fn into_lookup_error(self) -> Option<E> {
        match self {
            Self::Lookup { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Errors produced while loading or validating a [`PollConfig`](crate::PollConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Interval exceeds [`MAX_INTERVAL`](crate::config::MAX_INTERVAL).
    #[error("interval {interval:?} exceeds the maximum of {max:?}")]
    IntervalTooLong { interval: Duration, max: Duration },
    /// Source document could not be parsed.
    #[cfg(feature = "config")]
    #[error("invalid poll config: {0}")]
    Parse(#[from] serde_json::Error),
}
