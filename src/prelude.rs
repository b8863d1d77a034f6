//! Convenient re-exports for common freshpoll types.
#[cfg(feature = "config")]
pub use crate::{config::PollConfig, presets};
pub use crate::{
    error::PollError,
    lookup::{LookupCall, LookupOutcome, LookupService, ServiceLookup},
    request::{AccessToken, Identifier, RetrievalRequest},
    retriever::{PollingRetriever, Retrieval},
    sleeper::{Sleeper, TokioSleeper},
    telemetry::{LogSink, PollEvent},
    CancellationToken,
};
