//! The SDK entry point
//!
//! `StatsClient` owns one normalized `Client` for its whole lifetime. Building
//! it never blocks: normalization runs on a background task and the outcome
//! is published through a readiness state machine:
//!
//! - `Pending` → `Ready(client)` (normalization succeeded)
//! - `Pending` → `Failed(error)` (normalization failed; terminal)
//!
//! `post()` and `ready()` wait on `Pending` without polling and resume on the
//! transition. Dropping the `StatsClient` aborts every task it spawned.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::Secret;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{error, info, warn};
use transport::{ReqwestTransport, Transport};

use crate::client::Client;
use crate::error::{Error, ErrorKind, Result};
use crate::increment::spawn_increment_task;
use crate::normalize::{ClientInput, normalize};
use crate::options::{Endpoints, ExtraOptions};
use crate::reporter::{PostOverrides, StatsReporter};

/// Normalization state of a `StatsClient`.
#[derive(Debug, Clone)]
pub enum Readiness {
    Pending,
    Ready(Arc<Client>),
    Failed(Error),
}

impl Readiness {
    pub fn label(&self) -> &'static str {
        match self {
            Readiness::Pending => "pending",
            Readiness::Ready(_) => "ready",
            Readiness::Failed(_) => "failed",
        }
    }

    fn is_settled(&self) -> bool {
        !matches!(self, Readiness::Pending)
    }
}

pub struct StatsClientBuilder {
    api_key: Secret<String>,
    input: ClientInput,
    options: ExtraOptions,
    endpoints: Endpoints,
    transport: Option<Arc<dyn Transport>>,
}

impl StatsClientBuilder {
    pub fn options(mut self, options: ExtraOptions) -> Self {
        self.options = options;
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Start normalization in the background and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> StatsClient {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));
        let reporter = Arc::new(StatsReporter::new(
            transport,
            self.endpoints,
            self.api_key,
            self.options.fetch.guilds,
        ));
        let (state_tx, state_rx) = watch::channel(Readiness::Pending);
        let tasks: Arc<Mutex<Vec<AbortHandle>>> = Arc::default();

        let lifecycle = {
            let reporter = reporter.clone();
            let tasks = tasks.clone();
            let increment = self.options.increment.clone();
            let input = self.input;
            tokio::spawn(async move {
                let variant = input.variant();
                let outcome = normalize(
                    input,
                    reporter.transport(),
                    &reporter.endpoints().discord_base_url,
                )
                .await;
                match outcome {
                    Ok(client) => {
                        let client = Arc::new(client);
                        if let Some(handle) = spawn_increment_task(client.clone(), &increment) {
                            track(&tasks, handle.abort_handle());
                        }
                        state_tx.send_replace(Readiness::Ready(client));
                    }
                    Err(e) => {
                        error!(variant, error = %e, "client normalization failed");
                        state_tx.send_replace(Readiness::Failed(e));
                    }
                }
            })
        };
        track(&tasks, lifecycle.abort_handle());

        let stats = StatsClient {
            state: state_rx,
            reporter,
            options: self.options,
            tasks,
        };
        if let Some(interval) = stats.options.autopost_interval() {
            stats.spawn_autopost(interval);
        }
        stats
    }

    /// Start and wait for normalization; a normalization failure is returned here.
    pub async fn connect(self) -> Result<StatsClient> {
        let stats = self.start();
        stats.ready().await?;
        Ok(stats)
    }
}

fn track(tasks: &Mutex<Vec<AbortHandle>>, handle: AbortHandle) {
    tasks.lock().unwrap_or_else(|e| e.into_inner()).push(handle);
}

/// Posts bot statistics to DanBot Hosting.
pub struct StatsClient {
    state: watch::Receiver<Readiness>,
    reporter: Arc<StatsReporter>,
    options: ExtraOptions,
    tasks: Arc<Mutex<Vec<AbortHandle>>>,
}

impl StatsClient {
    /// Builder for a client posting with `api_key` on behalf of `input`.
    pub fn builder(api_key: impl Into<Secret<String>>, input: ClientInput) -> StatsClientBuilder {
        StatsClientBuilder {
            api_key: api_key.into(),
            input,
            options: ExtraOptions::default(),
            endpoints: Endpoints::default(),
            transport: None,
        }
    }

    pub fn options(&self) -> &ExtraOptions {
        &self.options
    }

    /// Snapshot of the readiness state.
    pub fn readiness(&self) -> Readiness {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), Readiness::Ready(_))
    }

    /// Wait until normalization settles. Resolves to the client, or to the
    /// normalization error (every caller sees the same error).
    pub async fn ready(&self) -> Result<Arc<Client>> {
        wait_ready(self.state.clone()).await
    }

    /// Post the current counts, waiting for normalization first if needed.
    pub async fn post(&self, overrides: PostOverrides) -> Result<Value> {
        let client = self.ready().await?;
        self.reporter.post(&client, overrides).await
    }

    /// Post once readiness settles and then every `interval`. Failed posts are
    /// logged and retried on the next tick; a failed normalization stops it.
    pub fn spawn_autopost(&self, interval: Duration) {
        let state = self.state.clone();
        let reporter = self.reporter.clone();
        let handle = tokio::spawn(async move {
            let client = match wait_ready(state).await {
                Ok(client) => client,
                Err(e) => {
                    warn!(error = %e, "autopost not started");
                    return;
                }
            };
            info!(client_id = client.id(), interval_ms = interval.as_millis() as u64, "autopost started");
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                // Outcome is already logged and counted by the reporter
                let _ = reporter.post(&client, PostOverrides::default()).await;
            }
        });
        track(&self.tasks, handle.abort_handle());
    }
}

async fn wait_ready(mut state: watch::Receiver<Readiness>) -> Result<Arc<Client>> {
    let settled = state
        .wait_for(Readiness::is_settled)
        .await
        .map(|state| (*state).clone())
        .map_err(|_| {
            Error::new(
                ErrorKind::ClientNotReady,
                "Client initialization was aborted before completing",
            )
        })?;
    match settled {
        Readiness::Ready(client) => Ok(client),
        Readiness::Failed(e) => Err(e),
        Readiness::Pending => Err(Error::client_not_ready()),
    }
}

impl Drop for StatsClient {
    fn drop(&mut self) {
        for handle in self.tasks.lock().unwrap_or_else(|e| e.into_inner()).drain(..) {
            handle.abort();
        }
    }
}
