//! Client normalization
//!
//! The caller declares which kind of input it has; normalization turns each
//! variant into a `Client`:
//!
//! | Variant       | Counts | Network                          |
//! |---------------|--------|----------------------------------|
//! | `Rich`/`Lean` | live   | none (runtime must be ready)     |
//! | `UserDefined` | static | none                             |
//! | `Token`       | static | identity lookup + guild count    |

use std::sync::{Arc, Weak};

use common::Secret;
use discord_api::ClientUser;
use tracing::{debug, info};
use transport::Transport;

use crate::client::{Client, LiveSource, StaticCounts};
use crate::error::{Error, Result};
use crate::metrics;
use crate::runtime::{LeanRuntime, RichRuntime};
use crate::user_count::{UserCountPolicy, resolve_user_count};

/// Input accepted by `StatsClient`, one variant per supported shape.
///
/// Runtime variants hold a non-owning reference: the caller keeps its `Arc`
/// alive for as long as live counts should be reported. Build them with
/// `ClientInput::rich` / `ClientInput::lean`.
pub enum ClientInput {
    /// Runtime with cache managers and a `ready_at` timestamp
    Rich(Weak<dyn RichRuntime>),
    /// Runtime with direct collections and a `ready` flag
    Lean(Weak<dyn LeanRuntime>),
    /// Identity and counts supplied by the caller
    UserDefined {
        id: String,
        client_info: ClientUser,
        guild_count: u64,
        user_count: UserCountPolicy,
    },
    /// Bare bot token; identity and (unless given) guild count come from Discord
    Token {
        token: Secret<String>,
        guild_count: Option<u64>,
        user_count: UserCountPolicy,
    },
}

impl ClientInput {
    pub fn rich<R: RichRuntime + 'static>(runtime: &Arc<R>) -> Self {
        let weak: Weak<dyn RichRuntime> = Arc::downgrade(runtime) as Weak<R>;
        ClientInput::Rich(weak)
    }

    pub fn lean<R: LeanRuntime + 'static>(runtime: &Arc<R>) -> Self {
        let weak: Weak<dyn LeanRuntime> = Arc::downgrade(runtime) as Weak<R>;
        ClientInput::Lean(weak)
    }

    pub fn variant(&self) -> &'static str {
        match self {
            ClientInput::Rich(_) => "rich",
            ClientInput::Lean(_) => "lean",
            ClientInput::UserDefined { .. } => "user_defined",
            ClientInput::Token { .. } => "token",
        }
    }
}

/// Build the normalized `Client` for `input`.
///
/// Only the `Token` variant touches the network, through `transport`
/// against `discord_base_url`.
pub async fn normalize(
    input: ClientInput,
    transport: &dyn Transport,
    discord_base_url: &str,
) -> Result<Client> {
    let variant = input.variant();
    let client = match input {
        ClientInput::Rich(weak) => {
            let runtime = weak.upgrade().ok_or_else(Error::runtime_dropped)?;
            if runtime.ready_at().is_none() {
                return Err(Error::client_not_ready());
            }
            let token = runtime.token().map(Secret::new);
            Client::live(runtime.user(), LiveSource::Rich(weak), token)
        }
        ClientInput::Lean(weak) => {
            let runtime = weak.upgrade().ok_or_else(Error::runtime_dropped)?;
            if !runtime.ready() {
                return Err(Error::client_not_ready());
            }
            let token = runtime.token().map(Secret::new);
            Client::live(runtime.user(), LiveSource::Lean(weak), token)
        }
        ClientInput::UserDefined {
            id,
            client_info,
            guild_count,
            user_count,
        } => {
            let users = resolve_user_count(user_count)?;
            Client::fixed(id, client_info, StaticCounts::new(guild_count, users), None)
        }
        ClientInput::Token {
            token,
            guild_count,
            user_count,
        } => {
            // Resolved up front: a bad policy fails before any network call
            let users = resolve_user_count(user_count)?;
            let user = discord_api::fetch_current_user(transport, discord_base_url, &token).await?;
            let guilds = match guild_count {
                Some(count) => count,
                None => {
                    debug!(user_id = %user.id, "no guild count supplied, fetching from Discord");
                    discord_api::fetch_guild_count(transport, discord_base_url, &token).await?
                }
            };
            Client::fixed(
                user.id.clone(),
                user,
                StaticCounts::new(guilds, users),
                Some(token),
            )
        }
    };

    metrics::record_normalized(variant);
    info!(
        client_id = client.id(),
        variant,
        guilds = client.guild_count(),
        live = client.is_live(),
        "client normalized"
    );
    Ok(client)
}
