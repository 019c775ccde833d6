//! In-memory transport that replays queued responses and records requests.
//!
//! Responses are handed out in FIFO order. An exhausted script answers with
//! `TransportError::Connect` so a test never hangs on a missing response.

use crate::{Request, Response, Result, Transport, TransportError};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

struct Step {
    delay: Option<Duration>,
    outcome: Result<Response>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn respond(self, status: u16, body: serde_json::Value) -> Self {
        self.push(None, Ok(Response::new(status, body)))
    }

    /// Queue a JSON response that is only delivered after `delay`.
    pub fn respond_after(self, delay: Duration, status: u16, body: serde_json::Value) -> Self {
        self.push(Some(delay), Ok(Response::new(status, body)))
    }

    /// Queue a transport-level failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.push(None, Err(error))
    }

    /// Queue a page of `len` guild summaries with ids `first_id..first_id + len`.
    pub fn guild_page(self, first_id: u64, len: usize) -> Self {
        let page: Vec<serde_json::Value> = (0..len as u64)
            .map(|i| serde_json::json!({ "id": (first_id + i).to_string(), "name": "guild" }))
            .collect();
        self.respond(200, serde_json::Value::Array(page))
    }

    fn push(self, delay: Option<Duration>, outcome: Result<Response>) -> Self {
        self.steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Step { delay, outcome });
        self
    }

    /// Snapshot of every request sent so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: Request) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + '_>> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        let step = self
            .steps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        Box::pin(async move {
            match step {
                Some(Step { delay, outcome }) => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    outcome
                }
                None => Err(TransportError::Connect("no scripted response left".into())),
            }
        })
    }
}
