//! DanBot Hosting API constants

/// Default DanBot Hosting API base.
pub const DEFAULT_STATS_BASE_URL: &str = "https://danbot.host/api";

/// Upper bound (inclusive) of the `"RANDOM"` user count policy.
pub const RANDOM_USER_COUNT_MAX: u64 = 150;

/// Defaults applied to a configured `increment.guild` section.
pub const DEFAULT_GUILD_INCREMENT: u64 = 30;
pub const DEFAULT_GUILD_INCREMENT_MS: u64 = 300_000;

/// Defaults applied to a configured `increment.user` section.
pub const DEFAULT_USER_INCREMENT: u64 = 2;
pub const DEFAULT_USER_INCREMENT_MS: u64 = 3_600_000;

/// Stats endpoint for a bot id: `{base}/bot/{id}/stats`.
pub fn stats_url(base_url: &str, bot_id: &str) -> String {
    format!("{}/bot/{bot_id}/stats", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_url_joins_without_double_slash() {
        assert_eq!(
            stats_url("https://danbot.host/api/", "42"),
            "https://danbot.host/api/bot/42/stats"
        );
        assert_eq!(
            stats_url(DEFAULT_STATS_BASE_URL, "42"),
            "https://danbot.host/api/bot/42/stats"
        );
    }
}
