//! Self-increment timers for static counts
//!
//! A client without a live source can be told to grow its own counts: every
//! `timeout_ms` the configured delta is added to the guild and/or user count.
//! The two timers are independent and run until the task is aborted. Posting
//! does not touch them.

use std::sync::Arc;

use tracing::{debug, info};

use crate::client::Client;
use crate::metrics;
use crate::options::{IncrementOptions, Schedule};

/// Spawn the increment timers for `client`.
///
/// Returns `None` when the client is live or no increment is configured.
pub fn spawn_increment_task(
    client: Arc<Client>,
    options: &IncrementOptions,
) -> Option<tokio::task::JoinHandle<()>> {
    if client.is_live() || !options.is_configured() {
        return None;
    }
    let guild = options.guild_schedule();
    let user = options.user_schedule();
    info!(
        client_id = client.id(),
        guild = ?guild,
        user = ?user,
        "starting increment timers"
    );

    Some(tokio::spawn(async move {
        tokio::join!(
            run_timer(&client, guild, Counter::Guild),
            run_timer(&client, user, Counter::User),
        );
    }))
}

#[derive(Debug, Clone, Copy)]
enum Counter {
    Guild,
    User,
}

impl Counter {
    fn label(self) -> &'static str {
        match self {
            Counter::Guild => "guild",
            Counter::User => "user",
        }
    }
}

async fn run_timer(client: &Client, schedule: Option<Schedule>, counter: Counter) {
    let (Some(schedule), Some(counts)) = (schedule, client.static_counts()) else {
        return;
    };
    let mut ticker = tokio::time::interval(schedule.every);
    // First tick completes immediately; the first increment is one period out
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match counter {
            Counter::Guild => {
                let guilds = counts.add_guilds(schedule.by);
                debug!(client_id = client.id(), guilds, "guild count incremented");
            }
            Counter::User => {
                let users = counts.add_users(schedule.by);
                debug!(client_id = client.id(), users = ?users, "user count incremented");
            }
        }
        metrics::record_increment(counter.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LiveSource, StaticCounts};
    use crate::options::IncrementRule;
    use crate::runtime::RichRuntime;
    use crate::runtime::fakes::{FakeRich, bot_user};
    use crate::user_count::Count;
    use std::time::Duration;

    fn static_client(users: Count) -> Arc<Client> {
        Arc::new(Client::fixed(
            "42".into(),
            bot_user(),
            StaticCounts::new(10, users),
            None,
        ))
    }

    fn rule(by: u64, timeout_ms: u64) -> Option<IncrementRule> {
        Some(IncrementRule {
            by: Some(by),
            timeout_ms: Some(timeout_ms),
        })
    }

    /// Let spawned tasks observe the advanced clock.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timers_tick_independently() {
        let client = static_client(Count::Finite(100));
        let options = IncrementOptions {
            guild: rule(30, 1_000),
            user: rule(2, 3_000),
        };
        let handle = spawn_increment_task(client.clone(), &options).unwrap();
        settle().await;
        assert_eq!(client.guild_count(), 10);

        tokio::time::advance(Duration::from_millis(1_000)).await;
        settle().await;
        assert_eq!(client.guild_count(), 40);
        assert_eq!(client.user_count(), Count::Finite(100));

        tokio::time::advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(client.guild_count(), 100);
        assert_eq!(client.user_count(), Count::Finite(102));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn only_configured_counter_changes() {
        let client = static_client(Count::Finite(5));
        let options = IncrementOptions {
            guild: None,
            user: rule(1, 500),
        };
        let handle = spawn_increment_task(client.clone(), &options).unwrap();
        settle().await;

        tokio::time::advance(Duration::from_millis(1_500)).await;
        settle().await;
        assert_eq!(client.guild_count(), 10);
        assert_eq!(client.user_count(), Count::Finite(8));
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_users_stay_unbounded() {
        let client = static_client(Count::Unbounded);
        let options = IncrementOptions {
            guild: None,
            user: rule(2, 100),
        };
        let handle = spawn_increment_task(client.clone(), &options).unwrap();
        settle().await;
        tokio::time::advance(Duration::from_millis(300)).await;
        settle().await;
        assert_eq!(client.user_count(), Count::Unbounded);
        handle.abort();
    }

    #[tokio::test]
    async fn nothing_configured_spawns_nothing() {
        let client = static_client(Count::Finite(1));
        assert!(spawn_increment_task(client, &IncrementOptions::default()).is_none());
    }

    #[tokio::test]
    async fn live_clients_are_never_incremented() {
        let runtime: Arc<dyn RichRuntime> = Arc::new(FakeRich::new(1, 1, Some(1)));
        let client = Arc::new(Client::live(
            bot_user(),
            LiveSource::Rich(Arc::downgrade(&runtime)),
            None,
        ));
        let options = IncrementOptions {
            guild: rule(1, 10),
            user: None,
        };
        assert!(spawn_increment_task(client, &options).is_none());
    }
}
