//! Adapter traits for live bot runtimes
//!
//! Two runtime shapes are supported. A "rich" runtime keeps its guilds and
//! users behind managers with a nested cache (`guilds().cache().size()`) and
//! marks readiness with a timestamp. A "lean" runtime exposes the collections
//! directly and marks readiness with a boolean. A bot library integrates by
//! implementing one of these traits for its client type.

use std::collections::{BTreeMap, HashMap};

use discord_api::ClientUser;

/// Anything that can report how many entries it currently holds.
pub trait SizedCollection: Send + Sync {
    fn size(&self) -> usize;
}

impl<K: Send + Sync, V: Send + Sync, S: Send + Sync> SizedCollection for HashMap<K, V, S> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl<K: Send + Sync, V: Send + Sync> SizedCollection for BTreeMap<K, V> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl<T: Send + Sync> SizedCollection for Vec<T> {
    fn size(&self) -> usize {
        self.len()
    }
}

/// A manager wrapping a cache container.
pub trait CachedCollection: Send + Sync {
    fn cache(&self) -> &dyn SizedCollection;
}

/// Runtime whose collections sit behind a nested cache.
pub trait RichRuntime: Send + Sync {
    /// The logged-in bot user.
    fn user(&self) -> ClientUser;
    fn guilds(&self) -> &dyn CachedCollection;
    fn users(&self) -> &dyn CachedCollection;
    /// Credential the runtime logged in with.
    fn token(&self) -> Option<String>;
    /// Unix milliseconds at which the runtime became ready; `None` before that.
    fn ready_at(&self) -> Option<i64>;
}

/// Runtime whose collections report their size directly.
pub trait LeanRuntime: Send + Sync {
    fn user(&self) -> ClientUser;
    fn guilds(&self) -> &dyn SizedCollection;
    fn users(&self) -> &dyn SizedCollection;
    fn token(&self) -> Option<String>;
    fn ready(&self) -> bool;
}
