#![allow(dead_code)]

use async_trait::async_trait;
use freshpoll::{AccessToken, Identifier, LookupOutcome, LookupService};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// One scripted response.
#[derive(Debug, Clone)]
pub enum Step {
    Status(u16),
    Ok(&'static str),
    Fail(&'static str),
}

/// Lookup service that replays a script, then repeats `fallback` forever.
#[derive(Debug)]
pub struct ScriptedStore {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: Mutex<Vec<(Identifier, String)>>,
}

impl ScriptedStore {
    pub fn new(script: impl IntoIterator<Item = Step>, fallback: Step) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Non-200 `status` on every call.
    pub fn always(status: u16) -> Self {
        Self::new([], Step::Status(status))
    }

    /// `misses` responses of 404, then 200 with `body` from then on.
    pub fn ready_after(misses: usize, body: &'static str) -> Self {
        Self::new(std::iter::repeat(Step::Status(404)).take(misses), Step::Ok(body))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Identifier, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupService for ScriptedStore {
    type Body = String;
    type Error = TransportError;

    async fn lookup(
        &self,
        identifier: &Identifier,
        token: &AccessToken,
    ) -> Result<LookupOutcome<String>, TransportError> {
        self.calls.lock().unwrap().push((identifier.clone(), token.expose().to_string()));
        let step = self.script.lock().unwrap().pop_front().unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Status(status) => Ok(LookupOutcome::with_status(status)),
            Step::Ok(body) => Ok(LookupOutcome::ok(body.to_string())),
            Step::Fail(reason) => Err(TransportError(reason.to_string())),
        }
    }
}
