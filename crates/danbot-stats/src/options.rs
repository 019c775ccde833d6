//! Extra options and endpoint configuration
//!
//! `ExtraOptions` is fixed once a `StatsClient` is built. It deserializes from
//! TOML/JSON so the service can load it straight from its config file.

use std::time::Duration;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_GUILD_INCREMENT, DEFAULT_GUILD_INCREMENT_MS, DEFAULT_STATS_BASE_URL,
    DEFAULT_USER_INCREMENT, DEFAULT_USER_INCREMENT_MS,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtraOptions {
    pub fetch: FetchOptions,
    pub increment: IncrementOptions,
    /// Autopost interval in milliseconds
    pub autopost_timeout: Option<u64>,
}

impl ExtraOptions {
    pub fn autopost_interval(&self) -> Option<Duration> {
        self.autopost_timeout
            .map(|ms| Duration::from_millis(ms.max(1)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchOptions {
    pub guilds: GuildFetchOptions,
}

/// When to re-fetch a static guild count from Discord before posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuildFetchOptions {
    /// Once, before the first post
    pub first_time: bool,
    /// Before every post
    pub every_post: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncrementOptions {
    pub guild: Option<IncrementRule>,
    pub user: Option<IncrementRule>,
}

/// A configured increment; omitted fields take the per-counter defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncrementRule {
    pub by: Option<u64>,
    pub timeout_ms: Option<u64>,
}

/// A resolved increment: add `by` every `every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub by: u64,
    pub every: Duration,
}

impl IncrementRule {
    fn resolve(self, default_by: u64, default_ms: u64) -> Schedule {
        // tokio intervals reject a zero period
        let ms = self.timeout_ms.unwrap_or(default_ms).max(1);
        Schedule {
            by: self.by.unwrap_or(default_by),
            every: Duration::from_millis(ms),
        }
    }
}

impl IncrementOptions {
    pub fn guild_schedule(&self) -> Option<Schedule> {
        self.guild
            .map(|rule| rule.resolve(DEFAULT_GUILD_INCREMENT, DEFAULT_GUILD_INCREMENT_MS))
    }

    pub fn user_schedule(&self) -> Option<Schedule> {
        self.user
            .map(|rule| rule.resolve(DEFAULT_USER_INCREMENT, DEFAULT_USER_INCREMENT_MS))
    }

    pub fn is_configured(&self) -> bool {
        self.guild.is_some() || self.user.is_some()
    }
}

/// Remote base URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub stats_base_url: String,
    pub discord_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            stats_base_url: DEFAULT_STATS_BASE_URL.to_owned(),
            discord_base_url: discord_api::DEFAULT_BASE_URL.to_owned(),
        }
    }
}
