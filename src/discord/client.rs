//! Discord bot client abstraction.
//!
//! Provides a high-level interface for creating and running the Discord bot,
//! hiding serenity implementation details from the rest of the application.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::async_trait;
use serenity::http::HttpBuilder;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::bridge::Relay;
use crate::common::{http_client, wait_for_shutdown};
use crate::discord::handler::RelayHandler;

/// Longest wait between reconnection attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
pub enum DiscordBotEvent {
    /// Bot connected and ready.
    Ready(Ready),
    /// Message received.
    Message { context: Context, message: Message },
}

struct DiscordBotEvents {
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
}

impl DiscordBotEvents {
    fn new(discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>) -> Self {
        Self { discord_events_tx }
    }
}

#[async_trait]
impl EventHandler for DiscordBotEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        if let Err(error) = self.discord_events_tx.send(DiscordBotEvent::Ready(ready)) {
            warn!("Failed to process discord event: {}", error);
        }
    }

    async fn message(&self, context: Context, message: Message) {
        if let Err(error) = self
            .discord_events_tx
            .send(DiscordBotEvent::Message { context, message })
        {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

async fn build_client(
    token: &str,
    request_timeout: Duration,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
) -> anyhow::Result<Client> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS;

    // Build a custom reqwest client with timeout settings
    let reqwest_client = http_client(request_timeout)?;

    // Build the Serenity HTTP client with our custom reqwest client
    let http = HttpBuilder::new(token).client(reqwest_client).build();

    let events = DiscordBotEvents::new(discord_events_tx);
    let client = serenity::client::ClientBuilder::new_with_http(http, intents)
        .event_handler(events)
        .await?;
    Ok(client)
}

/// Create an exponential backoff iterator for Discord reconnection.
/// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
fn discord_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(MAX_BACKOFF)
        .with_factor(1.1)
        .with_jitter()
        .without_max_times()
        .build()
}

/// Wait out a reconnect delay. Returns `true` if shutdown arrived first.
async fn sleep_or_shutdown(delay: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(delay) => false,
        _ = wait_for_shutdown(shutdown_rx) => {
            info!("Shutdown signal received during backoff");
            true
        }
    }
}

/// The Discord -> Slack half of the relay: a gateway connection that
/// reconnects until shutdown.
pub struct DiscordBot {
    token: String,
    request_timeout: Duration,
    handler: RelayHandler,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBot {
    pub fn new(
        token: String,
        request_timeout: Duration,
        relay: Arc<Relay>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            token,
            request_timeout,
            handler: RelayHandler::new(relay),
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        let (discord_events_tx, mut discord_events_rx) = mpsc::unbounded_channel();

        tokio::select! {
            _ = Self::run_connection(
                &self.token,
                self.request_timeout,
                &discord_events_tx,
                &mut self.shutdown_rx,
            ) => {},
            _ = Self::process_events(&mut discord_events_rx, &self.handler) => {},
        }
        info!("Discord task ended");
    }

    async fn run_connection(
        token: &str,
        request_timeout: Duration,
        discord_events_tx: &mpsc::UnboundedSender<DiscordBotEvent>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            // serenity mostly handles reconnections itself.
            let client = build_client(token, request_timeout, discord_events_tx.clone()).await;
            let mut client = match client {
                Ok(client) => {
                    backoff = discord_backoff();
                    client
                }
                Err(e) => {
                    error!("Failed to build Discord client: {}", e);
                    let delay = backoff.next().unwrap_or(MAX_BACKOFF);
                    warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                    if sleep_or_shutdown(delay, shutdown_rx).await {
                        break;
                    }
                    continue;
                }
            };
            let shard_manager = client.shard_manager.clone();

            tokio::select! {
                result = client.start() => match result {
                    Ok(()) => {
                        info!("Discord client disconnected normally");
                        break;
                    }
                    Err(e) => {
                        error!("Discord client error: {}", e);
                        let delay = backoff.next().unwrap_or(MAX_BACKOFF);
                        warn!(
                            "Discord disconnected. Reconnecting in {:.1}s...",
                            delay.as_secs_f64(),
                        );
                        if sleep_or_shutdown(delay, shutdown_rx).await {
                            break;
                        }
                    }
                },
                _ = wait_for_shutdown(shutdown_rx) => {
                    // Gracefully shutdown Discord gateway
                    info!("Initiating graceful Discord shutdown...");
                    shard_manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                    break;
                }
            }
        }
    }

    async fn process_events(
        discord_events_rx: &mut mpsc::UnboundedReceiver<DiscordBotEvent>,
        handler: &RelayHandler,
    ) {
        while let Some(event) = discord_events_rx.recv().await {
            match event {
                DiscordBotEvent::Ready(ready) => handler.handle_ready(&ready),
                DiscordBotEvent::Message { context, message } => {
                    handler.handle_message(&context, message).await;
                }
            }
        }
        debug!("Discord events channel closed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_backoff_interrupted_by_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        let waiter = tokio::spawn(async move { sleep_or_shutdown(MAX_BACKOFF, &mut rx).await });
        tokio::task::yield_now().await;

        tx.send(true).unwrap();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_elapses_without_shutdown() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(!sleep_or_shutdown(Duration::from_secs(5), &mut rx).await);
    }

    #[test]
    fn test_backoff_stays_within_bounds() {
        let delays: Vec<Duration> = discord_backoff().take(100).collect();
        assert_eq!(delays.len(), 100);
        assert!(delays.iter().all(|d| *d >= Duration::from_secs(5)));
        // Jitter may add up to one extra delay on top of the cap.
        assert!(delays.iter().all(|d| *d <= MAX_BACKOFF * 2));
    }
}
