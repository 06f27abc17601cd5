//! Scripted transport double for exercising the client without a network.

use super::transport::Transport;
use super::types::QueryParams;
use crate::error::Result;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// Replays canned responses in order and records every call.
///
/// Once the script runs out, every further call answers `{"data": []}`.
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<(String, QueryParams, Instant)>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (url, params) of every call, in order
    pub(crate) fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, params, _)| (url.clone(), params.clone()))
            .collect()
    }

    /// Clock reading at each call, in order
    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, _, at)| *at).collect()
    }
}

impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &str, params: &QueryParams) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), params.clone(), Instant::now()));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"data": []})))
    }
}
