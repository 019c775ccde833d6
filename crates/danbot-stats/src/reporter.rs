//! Stats posting
//!
//! `StatsReporter` turns a `Client` into one `POST {base}/bot/{id}/stats`.
//! The API key travels in the JSON body; no authorization header is sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use common::Secret;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use transport::{Request, Transport};

use crate::classify::classify_stats_response;
use crate::client::Client;
use crate::constants::stats_url;
use crate::error::{Error, ErrorKind, Result};
use crate::metrics;
use crate::options::{Endpoints, GuildFetchOptions};
use crate::user_count::Count;

/// Per-call replacements for the client's current counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostOverrides {
    pub guild_count: Option<u64>,
    pub user_count: Option<Count>,
}

pub struct StatsReporter {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    api_key: Secret<String>,
    refresh: GuildFetchOptions,
    first_refresh_done: AtomicBool,
}

impl StatsReporter {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        api_key: Secret<String>,
        refresh: GuildFetchOptions,
    ) -> Self {
        Self {
            transport,
            endpoints,
            api_key,
            refresh,
            first_refresh_done: AtomicBool::new(false),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Post the client's counts (or the overrides) and classify the response.
    ///
    /// A failed post leaves the reporter usable for the next call.
    pub async fn post(&self, client: &Client, overrides: PostOverrides) -> Result<Value> {
        if overrides.guild_count.is_none() {
            self.refresh_guild_count(client).await?;
        }

        let servers = overrides.guild_count.unwrap_or_else(|| client.guild_count());
        let users = overrides.user_count.unwrap_or_else(|| client.user_count());
        let payload = json!({
            "servers": servers,
            "users": users,
            "id": client.id(),
            "key": self.api_key.expose(),
            "clientInfo": client.client_info(),
        });
        let url = stats_url(&self.endpoints.stats_base_url, client.id());

        debug!(client_id = client.id(), servers, users = ?users, "posting stats");
        let started = Instant::now();
        let result = match self.transport.send(Request::post_json(url, payload)).await {
            Ok(response) => classify_stats_response(response.status, response.body),
            Err(e) => {
                warn!(client_id = client.id(), error = %e, "stats request produced no response");
                Err(Error::new(
                    ErrorKind::CloudflareRestricted,
                    format!("The stats request was blocked before reaching DanBot Hosting: {e}"),
                ))
            }
        };
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(_) => {
                metrics::record_post("ok", elapsed);
                info!(client_id = client.id(), servers, "stats posted");
            }
            Err(e) => {
                metrics::record_post(e.kind().code(), elapsed);
                warn!(client_id = client.id(), error = %e, "stats post failed");
            }
        }
        result
    }

    /// Re-fetch a static guild count from Discord when the options ask for it.
    ///
    /// The first-time refresh counts as done only once it succeeds; a failed
    /// attempt is retried by the next post.
    async fn refresh_guild_count(&self, client: &Client) -> Result<()> {
        let first = self.refresh.first_time && !self.first_refresh_done.load(Ordering::SeqCst);
        if !(self.refresh.every_post || first) {
            return Ok(());
        }
        let (Some(counts), Some(token)) = (client.static_counts(), client.token()) else {
            debug!(client_id = client.id(), "guild refresh skipped: no static count or token");
            self.first_refresh_done.store(true, Ordering::SeqCst);
            return Ok(());
        };

        let guilds = discord_api::fetch_guild_count(
            self.transport.as_ref(),
            &self.endpoints.discord_base_url,
            token,
        )
        .await?;
        counts.set_guild_count(guilds);
        self.first_refresh_done.store(true, Ordering::SeqCst);
        debug!(client_id = client.id(), guilds, "guild count refreshed");
        Ok(())
    }
}
