//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The stats API key and the Discord token are loaded from DANBOT_API_KEY /
//! DISCORD_TOKEN or from `api_key_file` / `token_file`; they are never
//! stored in the TOML directly.

use common::Secret;
use danbot_stats::{Endpoints, ExtraOptions, UserCountPolicy};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Autopost interval used when `options.autopost_timeout` is omitted (30 minutes).
pub const DEFAULT_AUTOPOST_MS: u64 = 1_800_000;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub stats: StatsConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub options: ExtraOptions,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}

/// DanBot Hosting stats API settings
#[derive(Debug, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_base_url")]
    pub base_url: String,
    #[serde(skip)]
    pub api_key: Option<Secret<String>>,
    /// Path to a file containing the API key (alternative to DANBOT_API_KEY env var)
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Bot identity settings
#[derive(Debug, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_discord_base_url")]
    pub base_url: String,
    #[serde(skip)]
    pub token: Option<Secret<String>>,
    /// Path to a file containing the bot token (alternative to DISCORD_TOKEN env var)
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Fixed guild count; fetched from Discord when omitted
    #[serde(default)]
    pub guild_count: Option<u64>,
    pub user_count: UserCountPolicy,
}

/// Optional Prometheus + health listener
#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    pub listen_addr: SocketAddr,
}

fn default_stats_base_url() -> String {
    danbot_stats::constants::DEFAULT_STATS_BASE_URL.to_owned()
}

fn default_discord_base_url() -> String {
    Endpoints::default().discord_base_url
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// Secret resolution order (per secret):
    /// 1. env var (DANBOT_API_KEY / DISCORD_TOKEN)
    /// 2. `*_file` path from config
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        for (field, url) in [
            ("stats.base_url", &config.stats.base_url),
            ("discord.base_url", &config.discord.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{field} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if config.stats.timeout_secs == 0 {
            return Err(common::Error::Config(
                "stats.timeout_secs must be greater than 0".into(),
            ));
        }

        match config.options.autopost_timeout {
            Some(0) => {
                return Err(common::Error::Config(
                    "options.autopost_timeout must be greater than 0".into(),
                ));
            }
            Some(_) => {}
            None => config.options.autopost_timeout = Some(DEFAULT_AUTOPOST_MS),
        }

        config.stats.api_key = resolve_secret(
            "DANBOT_API_KEY",
            "stats.api_key_file",
            config.stats.api_key_file.as_deref(),
        )?;
        if config.stats.api_key.is_none() {
            return Err(common::Error::MissingSecret(
                "set DANBOT_API_KEY or stats.api_key_file".into(),
            ));
        }

        config.discord.token = resolve_secret(
            "DISCORD_TOKEN",
            "discord.token_file",
            config.discord.token_file.as_deref(),
        )?;
        if config.discord.token.is_none() {
            return Err(common::Error::MissingSecret(
                "set DISCORD_TOKEN or discord.token_file".into(),
            ));
        }

        Ok(config)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            stats_base_url: self.stats.base_url.clone(),
            discord_base_url: self.discord.base_url.clone(),
        }
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("danbot-stats-poster.toml")
    }
}

/// Env var wins over file. Blank values count as absent.
fn resolve_secret(
    env: &str,
    field: &str,
    file: Option<&Path>,
) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env) {
        let secret = Secret::new(value.trim().to_owned());
        if !secret.is_blank() {
            return Ok(Some(secret));
        }
    }
    let Some(file) = file else {
        return Ok(None);
    };
    let value = std::fs::read_to_string(file).map_err(|e| {
        common::Error::Config(format!("failed to read {field} {}: {e}", file.display()))
    })?;
    let secret = Secret::new(value.trim().to_owned());
    Ok((!secret.is_blank()).then_some(secret))
}
