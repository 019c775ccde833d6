//! The normalized client view
//!
//! Whatever the caller started from, the SDK ends up with one `Client`: an id,
//! a display identity, a guild count and a user count. Counts are either live
//! (read from the runtime on every access, never cached) or static (held in
//! atomics and changed only by explicit writes and the increment timers). The
//! two never mix within one client.
//!
//! The token is kept in a `Secret` outside the serialized surface: `Serialize`
//! emits `id`, `clientInfo`, `guildCount` and `userCount` only.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, Weak};

use common::Secret;
use discord_api::ClientUser;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::warn;

use crate::runtime::{LeanRuntime, RichRuntime};
use crate::user_count::Count;

/// Non-owning back reference to the runtime a client was built from.
///
/// The SDK never keeps a runtime alive. Once the runtime is dropped, live
/// counts read as zero and every read logs a warning.
#[derive(Clone)]
pub enum LiveSource {
    Rich(Weak<dyn RichRuntime>),
    Lean(Weak<dyn LeanRuntime>),
}

impl LiveSource {
    fn guild_count(&self) -> u64 {
        let size = match self {
            LiveSource::Rich(runtime) => runtime.upgrade().map(|rt| rt.guilds().cache().size()),
            LiveSource::Lean(runtime) => runtime.upgrade().map(|rt| rt.guilds().size()),
        };
        self.size_or_zero(size, "guilds")
    }

    fn user_count(&self) -> Count {
        let size = match self {
            LiveSource::Rich(runtime) => runtime.upgrade().map(|rt| rt.users().cache().size()),
            LiveSource::Lean(runtime) => runtime.upgrade().map(|rt| rt.users().size()),
        };
        Count::Finite(self.size_or_zero(size, "users"))
    }

    fn size_or_zero(&self, size: Option<usize>, collection: &'static str) -> u64 {
        match size {
            Some(size) => size as u64,
            None => {
                warn!(
                    variant = self.variant(),
                    collection, "runtime was dropped, live count reads as zero"
                );
                0
            }
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            LiveSource::Rich(_) => "rich",
            LiveSource::Lean(_) => "lean",
        }
    }
}

/// Counts owned by the client itself.
///
/// Each read and write is a single atomic (or locked) operation, so
/// concurrent timers, refreshes and readers never observe a partial update.
#[derive(Debug)]
pub struct StaticCounts {
    guilds: AtomicU64,
    users: Mutex<Count>,
}

impl StaticCounts {
    pub fn new(guilds: u64, users: Count) -> Self {
        Self {
            guilds: AtomicU64::new(guilds),
            users: Mutex::new(users),
        }
    }

    pub fn guild_count(&self) -> u64 {
        self.guilds.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> Count {
        *self.users.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_guild_count(&self, value: u64) {
        self.guilds.store(value, Ordering::SeqCst);
    }

    pub fn set_user_count(&self, value: Count) {
        *self.users.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }

    /// Add to the guild count (saturating). Returns the new value.
    pub fn add_guilds(&self, by: u64) -> u64 {
        let previous = self
            .guilds
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            })
            .unwrap_or_else(|n| n);
        previous.saturating_add(by)
    }

    /// Add to the user count (saturating). An unbounded count stays unbounded.
    pub fn add_users(&self, by: u64) -> Count {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        *users = users.saturating_add(by);
        *users
    }
}

/// Where a client's counts come from.
pub enum Counts {
    Live(LiveSource),
    Static(StaticCounts),
}

/// Normalized view of a bot account.
pub struct Client {
    id: String,
    client_info: ClientUser,
    counts: Counts,
    token: Option<Secret<String>>,
}

impl Client {
    pub(crate) fn live(client_info: ClientUser, source: LiveSource, token: Option<Secret<String>>) -> Self {
        Self {
            id: client_info.id.clone(),
            client_info,
            counts: Counts::Live(source),
            token,
        }
    }

    pub(crate) fn fixed(
        id: String,
        client_info: ClientUser,
        counts: StaticCounts,
        token: Option<Secret<String>>,
    ) -> Self {
        Self {
            id,
            client_info,
            counts: Counts::Static(counts),
            token,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client_info(&self) -> &ClientUser {
        &self.client_info
    }

    /// Current guild count. Live clients read the runtime on every call.
    pub fn guild_count(&self) -> u64 {
        match &self.counts {
            Counts::Live(source) => source.guild_count(),
            Counts::Static(counts) => counts.guild_count(),
        }
    }

    /// Current user count. Live clients read the runtime on every call.
    pub fn user_count(&self) -> Count {
        match &self.counts {
            Counts::Live(source) => source.user_count(),
            Counts::Static(counts) => counts.user_count(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.counts, Counts::Live(_))
    }

    /// Writable counts; `None` for live clients.
    pub fn static_counts(&self) -> Option<&StaticCounts> {
        match &self.counts {
            Counts::Static(counts) => Some(counts),
            Counts::Live(_) => None,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Credential for server-side lookups. Crate-private: only the reporter's
    /// guild refresh reads it.
    pub(crate) fn token(&self) -> Option<&Secret<String>> {
        self.token.as_ref()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.counts {
            Counts::Live(source) => source.variant(),
            Counts::Static(_) => "static",
        };
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("client_info", &self.client_info)
            .field("guild_count", &self.guild_count())
            .field("user_count", &self.user_count())
            .field("source", &source)
            .field("token", &self.token)
            .finish()
    }
}

impl Serialize for Client {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Client", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("clientInfo", &self.client_info)?;
        state.serialize_field("guildCount", &self.guild_count())?;
        state.serialize_field("userCount", &self.user_count())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::fakes::{FakeLean, FakeRich, bot_user};
    use std::sync::Arc;

    fn static_client(token: Option<&str>) -> Client {
        Client::fixed(
            "42".into(),
            bot_user(),
            StaticCounts::new(10, Count::Finite(100)),
            token.map(Secret::from),
        )
    }

    #[test]
    fn rich_live_counts_follow_the_runtime() {
        let runtime = Arc::new(FakeRich::new(3, 40, Some(1)));
        let dyn_runtime: Arc<dyn RichRuntime> = runtime.clone();
        let client = Client::live(bot_user(), LiveSource::Rich(Arc::downgrade(&dyn_runtime)), None);

        assert_eq!(client.guild_count(), 3);
        runtime.guilds.cache.set(9);
        runtime.users.cache.set(77);
        assert_eq!(client.guild_count(), 9);
        assert_eq!(client.user_count(), Count::Finite(77));
        assert!(client.is_live());
        assert!(client.static_counts().is_none());
    }

    #[test]
    fn lean_live_counts_follow_the_runtime() {
        let runtime = Arc::new(FakeLean::new(1, 2, true));
        let dyn_runtime: Arc<dyn LeanRuntime> = runtime.clone();
        let client = Client::live(bot_user(), LiveSource::Lean(Arc::downgrade(&dyn_runtime)), None);

        runtime.guilds.set(5);
        assert_eq!(client.guild_count(), 5);
        assert_eq!(client.user_count(), Count::Finite(2));
    }

    #[test]
    fn dropped_runtime_reads_zero() {
        let runtime: Arc<dyn RichRuntime> = Arc::new(FakeRich::new(3, 4, Some(1)));
        let client = Client::live(bot_user(), LiveSource::Rich(Arc::downgrade(&runtime)), None);
        drop(runtime);
        assert_eq!(client.guild_count(), 0);
        assert_eq!(client.user_count(), Count::Finite(0));
    }

    #[test]
    fn static_counts_are_writable() {
        let client = static_client(None);
        let counts = client.static_counts().unwrap();
        counts.set_guild_count(20);
        assert_eq!(counts.add_guilds(5), 25);
        assert_eq!(counts.add_users(3), Count::Finite(103));
        assert_eq!(client.guild_count(), 25);
        assert_eq!(client.user_count(), Count::Finite(103));
        assert!(!client.is_live());
    }

    #[test]
    fn unbounded_users_absorb_increments() {
        let counts = StaticCounts::new(0, Count::Unbounded);
        assert_eq!(counts.add_users(2), Count::Unbounded);
        assert_eq!(counts.user_count(), Count::Unbounded);
    }

    #[test]
    fn max_finite_users_stay_finite() {
        let counts = StaticCounts::new(0, Count::Finite(u64::MAX));
        assert_eq!(counts.user_count(), Count::Finite(u64::MAX));

        let counts = StaticCounts::new(0, Count::Finite(u64::MAX - 1));
        assert_eq!(counts.add_users(10), Count::Finite(u64::MAX));
        assert_eq!(counts.add_users(1), Count::Finite(u64::MAX));

        let client = Client::fixed("42".into(), bot_user(), counts, None);
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["userCount"], serde_json::json!(u64::MAX));
    }

    #[test]
    fn guild_increment_saturates() {
        let counts = StaticCounts::new(u64::MAX - 1, Count::Finite(0));
        assert_eq!(counts.add_guilds(10), u64::MAX);
    }

    #[test]
    fn serialization_excludes_token() {
        let client = static_client(Some("super-secret-token"));
        let json = serde_json::to_value(&client).unwrap();

        assert_eq!(json["id"], "42");
        assert_eq!(json["clientInfo"]["username"], "statsbot");
        assert_eq!(json["guildCount"], 10);
        assert_eq!(json["userCount"], 100);
        let fields: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(fields.len(), 4);
        assert!(!json.to_string().contains("super-secret-token"));
        assert!(client.has_token());
    }

    #[test]
    fn debug_redacts_token() {
        let client = static_client(Some("super-secret-token"));
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret-token"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("static"));
    }
}
