//! The polling retriever.
//!
//! Semantics:
//! - The budget counts total lookups. It is consumed before each lookup's outcome is
//!   looked at, so a budget of `n` allows exactly `n` lookups.
//! - A lookup with status `200` ends the retrieval with its body.
//! - Any other status means "not visible yet": wait the request's interval, then try
//!   again. No wait follows the last attempt.
//! - An error from the lookup service ends the retrieval with [`PollError::Lookup`].
//!   It is never retried.
//! - Running out of budget is not an error: the result is [`Retrieval::NotFound`].
//!
//! Invariants:
//! - At most `effective_attempts()` lookups per retrieval.
//! - Attempts are strictly sequential; the next lookup starts only after the previous
//!   outcome was observed.
//! - Waits happen through the injected [`Sleeper`], which never blocks the executor,
//!   so concurrent retrievals make independent progress.
//!
//! ```rust
//! use std::time::Duration;
//! use freshpoll::{
//!     AccessToken, Identifier, InstantSleeper, LookupOutcome, LookupService, PollingRetriever,
//!     Retrieval, RetrievalRequest,
//! };
//!
//! struct AlwaysThere;
//!
//! #[async_trait::async_trait]
//! impl LookupService for AlwaysThere {
//!     type Body = &'static str;
//!     type Error = std::io::Error;
//!
//!     async fn lookup(&self, _: &Identifier, _: &AccessToken)
//!         -> Result<LookupOutcome<&'static str>, std::io::Error> {
//!         Ok(LookupOutcome::ok("ready"))
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let retriever = PollingRetriever::new(AlwaysThere).with_sleeper(InstantSleeper);
//! let request = RetrievalRequest::by_key("sync:42", "token").interval(Duration::from_millis(500));
//! assert_eq!(retriever.retrieve(&request).await.unwrap(), Retrieval::Found("ready"));
//! # });
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tower::Service;

use crate::error::PollError;
use crate::lookup::LookupService;
use crate::request::{Identifier, RetrievalRequest};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::telemetry::{emit_best_effort, NullSink, PollEvent};

/// Result of a retrieval that did not fail.
#[must_use = "a NotFound retrieval is not an error and must be checked"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval<B> {
    /// A lookup returned status 200 with this body.
    Found(B),
    /// Every attempt in the budget saw a non-200 status.
    NotFound,
}

impl<B> Retrieval<B> {
    /// `true` if a lookup returned the value.
    pub fn is_found(&self) -> bool {
        matches!(self, Retrieval::Found(_))
    }

    /// `true` if the budget ran out first.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Retrieval::NotFound)
    }

    /// Borrow the body, if found.
    pub fn found(&self) -> Option<&B> {
        match self {
            Retrieval::Found(body) => Some(body),
            Retrieval::NotFound => None,
        }
    }

    /// Take the body, if found.
    pub fn into_found(self) -> Option<B> {
        match self {
            Retrieval::Found(body) => Some(body),
            Retrieval::NotFound => None,
        }
    }

    /// Transform the body of a `Found`, leaving `NotFound` as is.
    pub fn map<U, F>(self, f: F) -> Retrieval<U>
    where
        F: FnOnce(B) -> U,
    {
        match self {
            Retrieval::Found(body) => Retrieval::Found(f(body)),
            Retrieval::NotFound => Retrieval::NotFound,
        }
    }
}

impl<B> From<Retrieval<B>> for Option<B> {
    fn from(retrieval: Retrieval<B>) -> Self {
        retrieval.into_found()
    }
}

/// Polls a [`LookupService`] until the value is visible or the budget runs out.
///
/// The retriever holds no per-call state; share it by reference or `Arc` across as many
/// concurrent retrievals as needed.
#[derive(Clone)]
pub struct PollingRetriever<L, S = NullSink> {
    lookup: L,
    sleeper: Arc<dyn Sleeper>,
    sink: S,
}

impl<L, S> fmt::Debug for PollingRetriever<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingRetriever")
            .field("lookup", &"<lookup>")
            .field("sleeper", &self.sleeper)
            .field("sink", &"<sink>")
            .finish()
    }
}

impl<L> PollingRetriever<L> {
    /// Retriever that waits on the tokio timer and discards telemetry.
    pub fn new(lookup: L) -> Self {
        Self { lookup, sleeper: Arc::new(TokioSleeper), sink: NullSink }
    }
}

impl<L, S> PollingRetriever<L, S> {
    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<T>(mut self, sleeper: T) -> Self
    where
        T: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Send poll events to `sink`.
    pub fn with_sink<T>(self, sink: T) -> PollingRetriever<L, T> {
        PollingRetriever { lookup: self.lookup, sleeper: self.sleeper, sink }
    }

    /// The lookup service this retriever polls.
    pub fn lookup_service(&self) -> &L {
        &self.lookup
    }
}

impl<L, S> PollingRetriever<L, S>
where
    L: LookupService,
    S: Service<PollEvent, Response = ()> + Clone + Send + Sync + 'static,
    S::Error: std::error::Error + Send + 'static,
    S::Future: Send + 'static,
{
    /// Poll until the value is visible or the budget is spent.
    pub async fn retrieve(
        &self,
        request: &RetrievalRequest,
    ) -> Result<Retrieval<L::Body>, PollError<L::Error>> {
        self.retrieve_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`retrieve`](Self::retrieve), but gives up with [`PollError::Cancelled`] as
    /// soon as `cancel` fires, abandoning any lookup or wait in progress.
    pub async fn retrieve_with_cancel(
        &self,
        request: &RetrievalRequest,
        cancel: &CancellationToken,
    ) -> Result<Retrieval<L::Body>, PollError<L::Error>> {
        let identifier = request.identifier();
        let interval = request.interval_duration();
        let started = Instant::now();

        let mut remaining = request.effective_attempts();
        let mut attempt: u32 = 0;

        while remaining > 0 {
            remaining -= 1;
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.cancelled(identifier, attempt - 1));
                }
                result = self.lookup.lookup(identifier, request.token()) => result,
            };

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(source) => {
                    tracing::warn!(%identifier, attempt, error = %source, "lookup failed");
                    self.emit(PollEvent::Failed { attempt });
                    return Err(PollError::Lookup { attempt, source });
                }
            };

            tracing::debug!(%identifier, attempt, status = outcome.status, "lookup attempt");
            self.emit(PollEvent::Attempt { attempt, status: outcome.status });

            if outcome.is_ok() {
                let elapsed = started.elapsed();
                tracing::info!(%identifier, attempts = attempt, ?elapsed, "value visible");
                self.emit(PollEvent::Found { attempts: attempt, elapsed });
                return Ok(Retrieval::Found(outcome.body));
            }

            if remaining > 0 {
                tracing::debug!(%identifier, attempt, delay = ?interval, "waiting before next attempt");
                self.emit(PollEvent::Waiting { attempt, delay: interval });
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(self.cancelled(identifier, attempt));
                    }
                    _ = self.sleeper.sleep(interval) => {}
                }
            }
        }

        let elapsed = started.elapsed();
        tracing::info!(%identifier, attempts = attempt, ?elapsed, "value not visible within budget");
        self.emit(PollEvent::Exhausted { attempts: attempt, elapsed });
        Ok(Retrieval::NotFound)
    }

    fn cancelled(&self, identifier: &Identifier, attempts: u32) -> PollError<L::Error> {
        tracing::warn!(%identifier, attempts, "retrieval cancelled");
        self.emit(PollEvent::Cancelled { attempts });
        PollError::Cancelled { attempts }
    }

    fn emit(&self, event: PollEvent) {
        emit_best_effort(self.sink.clone(), event);
    }
}
