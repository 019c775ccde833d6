//! Metrics emitted through the `metrics` facade
//!
//! - `danbot_stats_posts_total` (counter): label `outcome` (`ok` or an error code)
//! - `danbot_stats_post_duration_seconds` (histogram): label `outcome`
//! - `danbot_stats_increments_total` (counter): label `counter` (`guild`/`user`)
//! - `danbot_stats_clients_normalized_total` (counter): label `variant`
//!
//! Without an installed recorder every call is a no-op. The embedding binary
//! decides whether and how to export.

/// Record a finished stats post.
pub fn record_post(outcome: &str, duration_secs: f64) {
    metrics::counter!("danbot_stats_posts_total", "outcome" => outcome.to_string()).increment(1);
    metrics::histogram!("danbot_stats_post_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}

pub fn record_increment(counter: &'static str) {
    metrics::counter!("danbot_stats_increments_total", "counter" => counter).increment(1);
}

pub fn record_normalized(variant: &'static str) {
    metrics::counter!("danbot_stats_clients_normalized_total", "variant" => variant).increment(1);
}
