//! Poll an in-memory store that a background task fills in after a delay.
use freshpoll::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::service_fn;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let entries: Arc<Mutex<HashMap<Identifier, String>>> = Arc::default();

    // stands in for the event pipeline that writes the entry later
    let writer = entries.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1200)).await;
        if let Ok(mut map) = writer.lock() {
            map.insert(Identifier::type_and_id("identity", "2c91808"), "synced".to_string());
        }
    });

    let store = ServiceLookup::new(service_fn(move |call: LookupCall| {
        let found = entries.lock().ok().and_then(|map| map.get(&call.identifier).cloned());
        async move {
            Ok::<_, std::io::Error>(match found {
                Some(value) => LookupOutcome::ok(value),
                None => LookupOutcome::with_status(404),
            })
        }
    }));

    let retriever = PollingRetriever::new(store).with_sink(LogSink);
    let request = RetrievalRequest::by_type_and_id("identity", "2c91808", "demo-token")
        .with_config(&presets::responsive());

    match retriever.retrieve(&request).await? {
        Retrieval::Found(value) => println!("visible: {}", value),
        Retrieval::NotFound => println!("not visible within budget"),
    }
    Ok(())
}
