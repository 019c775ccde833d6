//! DanBot Hosting statistics SDK
//!
//! Reports a bot's guild and user counts to the DanBot Hosting stats API.
//! The caller hands over one of four inputs (a live runtime of either
//! supported shape, caller-defined identity and counts, or a bare bot token);
//! the SDK normalizes it into a `Client` and posts from there.
//!
//! Lifecycle:
//! 1. `StatsClient::builder(api_key, input).start()` spawns normalization
//! 2. Token inputs look up the bot identity and page through its guilds
//! 3. Readiness settles to `Ready(client)` or `Failed(error)`
//! 4. `post()` waits for readiness, then sends `{servers, users, id, key, clientInfo}`
//! 5. Optional increment timers and autopost run until the `StatsClient` is dropped

pub mod classify;
pub mod client;
pub mod constants;
pub mod error;
pub mod increment;
pub mod metrics;
pub mod normalize;
pub mod options;
pub mod reporter;
pub mod runtime;
pub mod stats_client;
pub mod user_count;

pub use classify::classify_stats_response;
pub use client::{Client, StaticCounts};
pub use discord_api::ClientUser;
pub use error::{Error, ErrorKind, Result};
pub use increment::spawn_increment_task;
pub use normalize::{ClientInput, normalize};
pub use options::{
    Endpoints, ExtraOptions, FetchOptions, GuildFetchOptions, IncrementOptions, IncrementRule,
    Schedule,
};
pub use reporter::{PostOverrides, StatsReporter};
pub use runtime::{CachedCollection, LeanRuntime, RichRuntime, SizedCollection};
pub use stats_client::{Readiness, StatsClient, StatsClientBuilder};
pub use user_count::{Count, UserCountPolicy, resolve_user_count};
