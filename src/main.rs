//! Ferryman - Slack-Discord chat relay
//!
//! Relays messages between one Slack channel and one Discord channel,
//! posting each message under its author's name and avatar.

mod bridge;
mod common;
mod config;
mod discord;
mod slack;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use bridge::{ProfileCache, Relay, RelaySettings};
use common::http_client;
use config::{env::get_config_path, load_and_validate};
use discord::{DiscordBot, DiscordWebhook};
use slack::{events, SlackProfileApi, SlackVerifier, SlackWebhook};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Ferryman v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        error!("See ferryman.conf.example for reference.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Slack channel: {}", config.slack.channel_id);
    info!("  Discord channel: #{}", config.discord.channel_name);
    info!("  Events endpoint: :{}{}", config.slack.port, config.slack.events_path);
    if config.relay.log_only {
        warn!("Log-only mode: messages will be resolved and logged but never delivered");
    }

    // ============================================================
    // Build the relay
    // ============================================================
    let request_timeout = config.relay.request_timeout();
    let client = http_client(request_timeout).context("Failed to build HTTP client")?;

    let profile_api = SlackProfileApi::new(
        client.clone(),
        config.slack.api_base.as_str(),
        config.slack.bot_token.as_str(),
    );
    let profiles = Arc::new(ProfileCache::new(Arc::new(profile_api), request_timeout));

    let discord_webhook = DiscordWebhook::connect(&config.discord.webhook_url)
        .await
        .context("Failed to resolve Discord webhook")?;
    let slack_webhook = SlackWebhook::new(client, config.slack.webhook_url.as_str());

    let relay = Arc::new(Relay::new(
        profiles,
        Arc::new(discord_webhook),
        Arc::new(slack_webhook),
        RelaySettings::from(&config),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ============================================================
    // Start Slack events endpoint
    // ============================================================
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.slack.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let router = events::router(
        &config.slack.events_path,
        Arc::clone(&relay),
        SlackVerifier::new(config.slack.signing_secret.as_str()),
    );

    let mut slack_task = tokio::spawn(events::serve(listener, router, shutdown_rx.clone()));

    // ============================================================
    // Start Discord bot
    // ============================================================
    info!("Starting Discord bot...");
    let discord_bot = DiscordBot::new(
        config.discord.token.clone(),
        request_timeout,
        Arc::clone(&relay),
        shutdown_rx,
    );
    let mut discord_task = tokio::spawn(discord_bot.run());

    // ============================================================
    // Run until a signal or either side stops
    // ============================================================
    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - stopping relay...");
        }
        result = &mut slack_task => {
            match result {
                Ok(Ok(())) => warn!("Slack events server stopped"),
                Ok(Err(e)) => error!("Slack events server failed: {}", e),
                Err(e) => error!("Slack events task panicked: {}", e),
            }
        }
        result = &mut discord_task => {
            if let Err(e) = result {
                error!("Discord task panicked: {}", e);
            } else {
                warn!("Discord bot stopped");
            }
        }
    }

    // Handle graceful shutdown (fire-and-forget - if channel closed, tasks are already gone)
    if let Err(e) = shutdown_tx.send(true) {
        debug!("Shutdown channel closed (tasks already exited): {}", e);
    }
    let timeout = Duration::from_secs(5);
    let stopped = tokio::time::timeout(timeout, async {
        if !slack_task.is_finished() {
            let _ = (&mut slack_task).await;
        }
        if !discord_task.is_finished() {
            let _ = (&mut discord_task).await;
        }
    })
    .await;
    if stopped.is_err() {
        warn!("Graceful shutdown timed out");
        slack_task.abort();
        discord_task.abort();
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
