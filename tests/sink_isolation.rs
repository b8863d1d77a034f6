//! A misbehaving telemetry sink must not change or delay a retrieval.
mod common;

use common::ScriptedStore;
use freshpoll::telemetry::PollEvent;
use freshpoll::{CancellationToken, PollError, PollingRetriever, Retrieval, RetrievalRequest};
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tower::{service_fn, Service};

/// Never becomes ready; counts how often it was asked.
#[derive(Clone, Default)]
struct NeverReady {
    polled: Arc<AtomicUsize>,
}

impl Service<PollEvent> for NeverReady {
    type Response = ();
    type Error = Infallible;
    type Future = futures::future::Ready<Result<(), Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.polled.fetch_add(1, Ordering::SeqCst);
        Poll::Pending
    }

    fn call(&mut self, _event: PollEvent) -> Self::Future {
        futures::future::ready(Ok(()))
    }
}

/// Ready, but every delivery takes an hour.
#[derive(Clone, Default)]
struct Sluggish {
    delivered: Arc<AtomicUsize>,
}

impl Service<PollEvent> for Sluggish {
    type Response = ();
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<(), Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _event: PollEvent) -> Self::Future {
        let delivered = self.delivered.clone();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

fn request() -> RetrievalRequest {
    RetrievalRequest::by_key("k", "token").interval(Duration::from_millis(1000))
}

#[tokio::test(start_paused = true)]
async fn never_ready_sink_does_not_hold_back_the_result() {
    let sink = NeverReady::default();
    let retriever =
        PollingRetriever::new(ScriptedStore::ready_after(0, "v")).with_sink(sink.clone());

    let result = timeout(Duration::from_secs(5), retriever.retrieve(&request()))
        .await
        .expect("retrieval finished")
        .unwrap();

    assert_eq!(result, Retrieval::Found("v".to_string()));
    assert!(sink.polled.load(Ordering::SeqCst) > 0);
}

#[tokio::test(start_paused = true)]
async fn never_ready_sink_does_not_hold_back_exhaustion() {
    let retriever =
        PollingRetriever::new(ScriptedStore::always(404)).with_sink(NeverReady::default());
    let start = Instant::now();

    let result = timeout(Duration::from_secs(60), retriever.retrieve(&request().max_attempts(3)))
        .await
        .expect("retrieval finished")
        .unwrap();

    assert!(result.is_not_found());
    assert!(start.elapsed() < Duration::from_millis(3000), "elapsed {:?}", start.elapsed());
    assert_eq!(retriever.lookup_service().call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancellation_returns_with_never_ready_sink() {
    let retriever = Arc::new(
        PollingRetriever::new(ScriptedStore::always(404)).with_sink(NeverReady::default()),
    );
    let cancel = CancellationToken::new();

    let task = {
        let retriever = retriever.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            retriever.retrieve_with_cancel(&request().max_attempts(10), &cancel).await
        })
    };

    tokio::time::sleep(Duration::from_millis(1500)).await;
    cancel.cancel();

    let err = timeout(Duration::from_secs(5), task)
        .await
        .expect("retrieval returned after cancel")
        .expect("task")
        .unwrap_err();

    assert!(matches!(err, PollError::Cancelled { attempts: 2 }));
}

#[tokio::test]
async fn erroring_sink_leaves_result_unchanged() {
    let sink = service_fn(|_event: PollEvent| async {
        Err::<(), _>(io::Error::new(io::ErrorKind::BrokenPipe, "collector gone"))
    });
    let retriever = PollingRetriever::new(ScriptedStore::ready_after(1, "v"))
        .with_sleeper(freshpoll::InstantSleeper)
        .with_sink(sink);

    let result = retriever.retrieve(&request()).await.unwrap();

    assert_eq!(result, Retrieval::Found("v".to_string()));
    assert_eq!(retriever.lookup_service().call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_sink_delivers_in_the_background() {
    let sink = Sluggish::default();
    let retriever =
        PollingRetriever::new(ScriptedStore::ready_after(2, "v")).with_sink(sink.clone());
    let start = Instant::now();

    let result = retriever.retrieve(&request()).await.unwrap();

    assert_eq!(result, Retrieval::Found("v".to_string()));
    // two waits, nothing spent on telemetry
    assert!(start.elapsed() < Duration::from_millis(3000), "elapsed {:?}", start.elapsed());
    assert_eq!(sink.delivered.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(3601)).await;
    // Attempt x3, Waiting x2, Found
    assert_eq!(sink.delivered.load(Ordering::SeqCst), 6);
}
