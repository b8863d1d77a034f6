//! Telemetry for polling retrievals.
//!
//! Every retrieval reports what it does as [`PollEvent`]s: each attempt and the status it
//! saw, each wait, and how the retrieval ended. Events go to a sink, which is any
//! `tower::Service<PollEvent>`; sinks compose with ordinary tower combinators.
//!
//! ```rust
//! use freshpoll::telemetry::{MemorySink, PollEvent};
//! use std::time::Duration;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let sink = MemorySink::with_capacity(16);
//! freshpoll::telemetry::emit_best_effort(
//!     sink.clone(),
//!     PollEvent::Waiting { attempt: 1, delay: Duration::from_millis(500) },
//! );
//! assert_eq!(sink.len(), 1);
//! # });
//! ```

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{self, Ready};
use tower::Service;

/// Events emitted by a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    /// A lookup completed and returned `status`.
    Attempt {
        /// 1-indexed attempt number
        attempt: u32,
        status: u16,
    },
    /// The retriever is about to wait before the next attempt.
    Waiting { attempt: u32, delay: Duration },
    /// The value became visible.
    Found { attempts: u32, elapsed: Duration },
    /// The budget ran out without the value becoming visible.
    Exhausted { attempts: u32, elapsed: Duration },
    /// The lookup service raised an error on `attempt`.
    Failed { attempt: u32 },
    /// The caller cancelled the retrieval.
    Cancelled { attempts: u32 },
}

impl fmt::Display for PollEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollEvent::Attempt { attempt, status } => {
                write!(f, "Attempt(#{}, status={})", attempt, status)
            }
            PollEvent::Waiting { attempt, delay } => {
                write!(f, "Waiting(after=#{}, delay={:?})", attempt, delay)
            }
            PollEvent::Found { attempts, elapsed } => {
                write!(f, "Found(attempts={}, elapsed={:?})", attempts, elapsed)
            }
            PollEvent::Exhausted { attempts, elapsed } => {
                write!(f, "Exhausted(attempts={}, elapsed={:?})", attempts, elapsed)
            }
            PollEvent::Failed { attempt } => write!(f, "Failed(#{})", attempt),
            PollEvent::Cancelled { attempts } => write!(f, "Cancelled(attempts={})", attempts),
        }
    }
}

/// Deliver one event without ever waiting on the sink.
///
/// The event is dropped if the sink is not ready right now or reports an error. A
/// delivery that does not finish immediately continues on a spawned task when a tokio
/// runtime is available, and is dropped otherwise. Telemetry never changes the outcome
/// or the timing of a retrieval.
pub fn emit_best_effort<S>(sink: S, event: PollEvent)
where
    S: Service<PollEvent, Response = ()> + Send,
    S::Error: std::error::Error + Send + 'static,
    S::Future: Send + 'static,
{
    use futures::FutureExt;
    use tower::ServiceExt;

    let Some(Ok(mut ready)) = sink.ready_oneshot().now_or_never() else {
        return;
    };
    let mut delivery = Box::pin(ready.call(event));
    if delivery.as_mut().now_or_never().is_none() {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(delivery);
        }
    }
}

/// Discards all events.
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl Service<PollEvent> for NullSink {
    type Response = ();
    type Error = Infallible;
    type Future = Ready<Result<(), Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _event: PollEvent) -> Self::Future {
        future::ready(Ok(()))
    }
}

/// Logs events through `tracing` at debug level.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl Service<PollEvent> for LogSink {
    type Response = ();
    type Error = Infallible;
    type Future = Ready<Result<(), Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: PollEvent) -> Self::Future {
        tracing::debug!(event = %event, "poll_event");
        future::ready(Ok(()))
    }
}

/// Keeps the most recent events in memory, evicting the oldest past `capacity`.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<VecDeque<PollEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_capacity(1_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PollEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<PollEvent> for MemorySink {
    type Response = ();
    type Error = Infallible;
    type Future = Ready<Result<(), Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: PollEvent) -> Self::Future {
        let mut events = self.lock();
        if events.len() >= self.capacity {
            events.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        events.push_back(event);
        future::ready(Ok(()))
    }
}
