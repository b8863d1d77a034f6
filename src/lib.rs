#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # freshpoll
//!
//! Bounded, fixed-interval polling for values that show up asynchronously in a
//! TTL-bound key-value store.
//!
//! An upstream pipeline writes entries some time after the event that produced them, and
//! those entries expire again after about a minute. A single read right after the event
//! races the write; `freshpoll` polls a [`LookupService`] a bounded number of times, a
//! fixed interval apart, until the store answers `200`.
//!
//! ## Features
//!
//! - **Attempt budget** with a documented fallback of 10 attempts
//! - **Fixed interval** waits on the tokio timer, never blocking other retrievals
//! - **Not-found is a value**: [`Retrieval::NotFound`], distinct from lookup failures
//! - **Lookup failures propagate** immediately and are never retried
//! - **Cancellation** through a caller-supplied `CancellationToken`
//! - **Telemetry** as `tower::Service<PollEvent>` sinks, plus `tracing` logs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use freshpoll::{presets, LookupCall, LookupOutcome, PollingRetriever, RetrievalRequest, ServiceLookup};
//! use tower::service_fn;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ServiceLookup::new(service_fn(|call: LookupCall| async move {
//!         // Replace with a real read against your store
//!         Ok::<_, std::io::Error>(LookupOutcome::ok(format!("value for {}", call.identifier)))
//!     }));
//!     let retriever = PollingRetriever::new(store);
//!
//!     let request = RetrievalRequest::by_type_and_id("identity", "2c9180", "token")
//!         .with_config(&presets::standard());
//!     match retriever.retrieve(&request).await?.into_found() {
//!         Some(body) => println!("visible: {}", body),
//!         None => println!("not visible within budget"),
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(feature = "config")]
pub mod config;
pub mod error;
pub mod lookup;
pub mod prelude;
#[cfg(feature = "config")]
pub mod presets;
pub mod request;
pub mod retriever;
pub mod sleeper;
pub mod telemetry;

// Re-exports
#[cfg(feature = "config")]
pub use config::PollConfig;
pub use error::{ConfigError, PollError};
pub use lookup::{LookupCall, LookupOutcome, LookupService, ServiceLookup, STATUS_OK};
pub use request::{
    AccessToken, Identifier, RetrievalRequest, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS,
};
pub use retriever::{PollingRetriever, Retrieval};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use tokio_util::sync::CancellationToken;
