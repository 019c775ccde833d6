//! DanBot stats poster
//!
//! Single-binary service that:
//! 1. Loads the bot token and stats API key from env or secret files
//! 2. Resolves the bot identity (and guild count) from Discord
//! 3. Posts stats to DanBot Hosting on the configured interval
//! 4. Optionally serves /health and /metrics

mod config;
mod metrics;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use danbot_stats::{ClientInput, StatsClient};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::ReqwestTransport;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting danbot-stats-poster");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        stats_base_url = %config.stats.base_url,
        discord_base_url = %config.discord.base_url,
        autopost_ms = config.options.autopost_timeout,
        fixed_guild_count = config.discord.guild_count,
        increments = config.options.increment.is_configured(),
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let transport = ReqwestTransport::new(http)
        .with_timeout(Duration::from_secs(config.stats.timeout_secs));

    let api_key = config
        .stats
        .api_key
        .take()
        .context("stats API key missing after config load")?;
    let token = config
        .discord
        .token
        .take()
        .context("Discord token missing after config load")?;

    let input = ClientInput::Token {
        token,
        guild_count: config.discord.guild_count,
        user_count: config.discord.user_count,
    };
    let stats = Arc::new(
        StatsClient::builder(api_key, input)
            .options(config.options.clone())
            .endpoints(config.endpoints())
            .transport(Arc::new(transport))
            .start(),
    );

    let metrics_server = match &config.metrics {
        Some(metrics_config) => {
            let prometheus =
                metrics::install_recorder().context("failed to install Prometheus recorder")?;
            let listener = TcpListener::bind(metrics_config.listen_addr)
                .await
                .with_context(|| format!("failed to bind {}", metrics_config.listen_addr))?;
            info!(listen_addr = %metrics_config.listen_addr, "serving /health and /metrics");
            let router = metrics::build_router(metrics::MetricsState {
                prometheus,
                stats: stats.clone(),
            });
            Some(tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, router).await {
                    error!(error = %e, "metrics server failed");
                }
            }))
        }
        None => None,
    };

    let client = stats
        .ready()
        .await
        .context("failed to initialize the stats client")?;
    info!(
        client_id = client.id(),
        username = %client.client_info().username,
        guilds = client.guild_count(),
        "stats client ready, autoposting"
    );

    shutdown_signal().await;
    info!("shutdown signal received");

    if let Some(server) = metrics_server {
        server.abort();
    }
    drop(client);
    drop(stats);
    info!("danbot-stats-poster stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
