//! The single-shot store read that the retriever polls.
//!
//! A [`LookupService`] performs one point-in-time read and reports what the store said:
//! a status code and a payload. Reaching the store at all is the implementation's
//! business; failing to do so is reported through `Err` and ends the retrieval.
//!
//! Any `tower::Service<LookupCall>` can act as a lookup service through
//! [`ServiceLookup`]:
//!
//! ```rust
//! use freshpoll::{Identifier, LookupCall, LookupOutcome, LookupService, ServiceLookup};
//! use tower::service_fn;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let lookup = ServiceLookup::new(service_fn(|call: LookupCall| async move {
//!     Ok::<_, std::io::Error>(LookupOutcome::ok(call.identifier.to_string()))
//! }));
//! let outcome = lookup.lookup(&Identifier::key("abc"), &"token".into()).await.unwrap();
//! assert_eq!(outcome.body, "key=abc");
//! # });
//! ```

use crate::request::{AccessToken, Identifier};
use async_trait::async_trait;
use std::sync::Arc;
use tower::{Service, ServiceExt};

/// Status reported by the store when the entry is present and valid.
pub const STATUS_OK: u16 = 200;

/// What one lookup observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome<B> {
    pub status: u16,
    /// Only meaningful when `status == STATUS_OK`.
    pub body: B,
}

impl<B> LookupOutcome<B> {
    pub fn new(status: u16, body: B) -> Self {
        Self { status, body }
    }

    /// A present-and-valid outcome.
    pub fn ok(body: B) -> Self {
        Self::new(STATUS_OK, body)
    }

    /// A non-success outcome with an empty body.
    pub fn with_status(status: u16) -> Self
    where
        B: Default,
    {
        Self::new(status, B::default())
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// One read against the external store.
///
/// Implementations must be safe to call concurrently from many retrievals.
#[async_trait]
pub trait LookupService: Send + Sync {
    type Body: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn lookup(
        &self,
        identifier: &Identifier,
        token: &AccessToken,
    ) -> Result<LookupOutcome<Self::Body>, Self::Error>;
}

#[async_trait]
impl<T> LookupService for Arc<T>
where
    T: LookupService + ?Sized,
{
    type Body = T::Body;
    type Error = T::Error;

    async fn lookup(
        &self,
        identifier: &Identifier,
        token: &AccessToken,
    ) -> Result<LookupOutcome<Self::Body>, Self::Error> {
        (**self).lookup(identifier, token).await
    }
}

#[async_trait]
impl<T> LookupService for &T
where
    T: LookupService + ?Sized,
{
    type Body = T::Body;
    type Error = T::Error;

    async fn lookup(
        &self,
        identifier: &Identifier,
        token: &AccessToken,
    ) -> Result<LookupOutcome<Self::Body>, Self::Error> {
        (**self).lookup(identifier, token).await
    }
}

/// Request handed to a tower service by [`ServiceLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub identifier: Identifier,
    pub token: AccessToken,
}

/// Adapts a `tower::Service<LookupCall>` into a [`LookupService`].
///
/// Each lookup clones the service and drives it with `oneshot`, so readiness is
/// respected and concurrent retrievals never contend on `&mut self`.
#[derive(Debug, Clone)]
pub struct ServiceLookup<S> {
    inner: S,
}

impl<S> ServiceLookup<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S, B> LookupService for ServiceLookup<S>
where
    S: Service<LookupCall, Response = LookupOutcome<B>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: std::error::Error + Send + Sync + 'static,
    B: Send + 'static,
{
    type Body = B;
    type Error = S::Error;

    async fn lookup(
        &self,
        identifier: &Identifier,
        token: &AccessToken,
    ) -> Result<LookupOutcome<B>, S::Error> {
        let call = LookupCall { identifier: identifier.clone(), token: token.clone() };
        self.inner.clone().oneshot(call).await
    }
}
