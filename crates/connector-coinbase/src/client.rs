use common::ExponentialBackoff;
use connector_core::{ConnectorConfig, ConnectorError, EventSender};
use futures_util::{SinkExt, StreamExt};
use metrics::SharedMetrics;
use model::FeedEvent;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

use crate::parser::{parse_message, ParsedMessage};

/// Duration of stable connection before resetting backoff.
const STABLE_CONNECTION_THRESHOLD: Duration = Duration::from_secs(300);

/// Timeout for WebSocket connection attempts.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Builds the subscription request sent right after connecting.
pub fn build_subscribe_message(product_ids: &[String], channels: &[String]) -> String {
    serde_json::json!({
        "type": "subscribe",
        "product_ids": product_ids,
        "channels": channels,
    })
    .to_string()
}

enum ConnectResult {
    Connected(WsStream),
    Shutdown,
    Error(ConnectorError),
}

/// Connects with a timeout, giving up early if shutdown is signalled.
async fn connect_with_timeout(url: &str, shutdown_rx: &mut watch::Receiver<bool>) -> ConnectResult {
    let connect = tokio::time::timeout(CONNECTION_TIMEOUT, connect_async(url));
    tokio::pin!(connect);

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    return ConnectResult::Shutdown;
                }
            }

            result = &mut connect => {
                return match result {
                    Ok(Ok((stream, _))) => ConnectResult::Connected(stream),
                    Ok(Err(e)) => ConnectResult::Error(ConnectorError::WebSocket(e.to_string())),
                    Err(_) => ConnectResult::Error(ConnectorError::WebSocket("connection timeout".to_string())),
                };
            }
        }
    }
}

enum SessionResult {
    Shutdown,
    /// Session was established and later ended.
    Connected {
        duration: Duration,
        error: ConnectorError,
    },
    ConnectFailed(ConnectorError),
}

/// What to do with one parsed feed message.
enum Dispatch {
    Forward(FeedEvent),
    Skip,
}

fn dispatch(message: ParsedMessage, config: &ConnectorConfig, metrics: &SharedMetrics) -> Dispatch {
    let subscribed = |product_id: &str| config.product_ids.iter().any(|p| p == product_id);

    match message {
        ParsedMessage::Snapshot(snapshot) => {
            if !subscribed(&snapshot.product_id) {
                return Dispatch::Skip;
            }
            metrics.inc_snapshots_received();
            info!(
                product_id = %snapshot.product_id,
                bids = snapshot.bids.len(),
                asks = snapshot.asks.len(),
                "Received book snapshot"
            );
            Dispatch::Forward(FeedEvent::Snapshot(snapshot))
        }
        ParsedMessage::Update(update) => {
            if !subscribed(&update.product_id) {
                return Dispatch::Skip;
            }
            metrics.inc_updates_received();
            Dispatch::Forward(FeedEvent::Update(update))
        }
        ParsedMessage::Subscriptions(channels) => {
            info!(channels = ?channels, "Subscription confirmed");
            Dispatch::Skip
        }
        ParsedMessage::Heartbeat { product_id } => {
            trace!(product_id = ?product_id, "Heartbeat");
            Dispatch::Skip
        }
        ParsedMessage::Error { message, reason } => {
            metrics.inc_feed_errors();
            error!(message = %message, reason = ?reason, "Feed returned an error");
            Dispatch::Skip
        }
        ParsedMessage::Unknown => Dispatch::Skip,
    }
}

/// Runs one connection: connect, subscribe, forward events until it ends.
async fn run_session(
    config: &ConnectorConfig,
    sender: &EventSender,
    shutdown_rx: &mut watch::Receiver<bool>,
    metrics: &SharedMetrics,
) -> SessionResult {
    let url = config.environment.ws_feed_url();
    info!(url = %url, environment = %config.environment, "Connecting to Coinbase feed");

    let ws_stream = match connect_with_timeout(url, shutdown_rx).await {
        ConnectResult::Connected(stream) => stream,
        ConnectResult::Shutdown => return SessionResult::Shutdown,
        ConnectResult::Error(e) => return SessionResult::ConnectFailed(e),
    };

    let connected_at = Instant::now();
    let (mut write, mut read) = ws_stream.split();

    let subscribe = build_subscribe_message(&config.product_ids, &config.channels);
    if let Err(e) = write.send(Message::Text(subscribe)).await {
        metrics.inc_websocket_errors();
        return SessionResult::Connected {
            duration: connected_at.elapsed(),
            error: ConnectorError::WebSocket(e.to_string()),
        };
    }
    info!(
        products = ?config.product_ids,
        channels = ?config.channels,
        "Connected, subscription sent"
    );

    let ended = |error: ConnectorError| SessionResult::Connected {
        duration: connected_at.elapsed(),
        error,
    };

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("Shutdown signal received, closing connection");
                    let _ = write.close().await;
                    return SessionResult::Shutdown;
                }
            }

            msg_opt = read.next() => {
                let msg = match msg_opt {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        metrics.inc_websocket_errors();
                        return ended(ConnectorError::WebSocket(e.to_string()));
                    }
                    None => {
                        info!("WebSocket stream ended");
                        return ended(ConnectorError::ConnectionClosed);
                    }
                };

                match msg {
                    Message::Text(text) => {
                        metrics.inc_messages_received();
                        let parsed = match parse_message(&text) {
                            Ok(parsed) => parsed,
                            Err(e) => {
                                metrics.inc_parse_errors();
                                warn!(error = %e, "Failed to parse message");
                                continue;
                            }
                        };

                        if let Dispatch::Forward(event) = dispatch(parsed, config, metrics) {
                            if sender.send(event).await.is_err() {
                                info!("Receiver dropped, stopping connector");
                                return ended(ConnectorError::ChannelClosed);
                            }
                        }
                    }
                    Message::Ping(data) => {
                        debug!("Received Ping, sending Pong");
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!(error = %e, "Failed to send Pong");
                            metrics.inc_websocket_errors();
                            return ended(ConnectorError::WebSocket(e.to_string()));
                        }
                    }
                    Message::Close(frame) => {
                        info!(frame = ?frame, "WebSocket closed by server");
                        return ended(ConnectorError::ConnectionClosed);
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Waits for `delay` unless shutdown arrives first. Returns `true` on shutdown.
async fn sleep_or_shutdown(delay: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        changed = shutdown_rx.changed() => changed.is_err() || *shutdown_rx.borrow(),
    }
}

/// Bookkeeping once an established session has ended.
///
/// Returns the delay before reconnecting, or the error that ends the
/// connector for good.
fn after_session(
    error: ConnectorError,
    duration: Duration,
    reconnecting: bool,
    backoff: &mut ExponentialBackoff,
    metrics: &SharedMetrics,
) -> Result<Duration, ConnectorError> {
    if matches!(error, ConnectorError::ChannelClosed) {
        return Err(error);
    }

    if reconnecting {
        metrics.inc_reconnect_successes();
    }

    if duration >= STABLE_CONNECTION_THRESHOLD {
        info!(
            duration_secs = duration.as_secs(),
            "Connection was stable, resetting backoff"
        );
        backoff.reset();
    }

    metrics.inc_reconnect_attempts();
    let delay = backoff.next_delay();
    warn!(
        error = %error,
        attempt = backoff.attempt(),
        delay_secs = delay.as_secs_f64(),
        "Connection lost, reconnecting"
    );
    Ok(delay)
}

/// Runs the feed connector with automatic reconnection.
///
/// Every new session resubscribes, so the exchange sends a fresh snapshot that
/// replaces the local book. Returns when shutdown is signalled or the event
/// receiver is dropped.
pub async fn run_connector(
    config: ConnectorConfig,
    sender: EventSender,
    mut shutdown_rx: watch::Receiver<bool>,
    metrics: SharedMetrics,
) -> Result<(), ConnectorError> {
    let mut backoff = ExponentialBackoff::default();
    let mut reconnecting = false;

    loop {
        if *shutdown_rx.borrow() {
            info!("Shutdown requested, exiting connector");
            return Ok(());
        }

        let delay = match run_session(&config, &sender, &mut shutdown_rx, &metrics).await {
            SessionResult::Shutdown => {
                info!("Connector shutdown complete");
                return Ok(());
            }
            SessionResult::Connected { duration, error } => {
                let delay = after_session(error, duration, reconnecting, &mut backoff, &metrics)?;
                reconnecting = true;
                delay
            }
            SessionResult::ConnectFailed(e) => {
                metrics.inc_connection_failures();
                reconnecting = true;

                let delay = backoff.next_delay();
                warn!(
                    error = %e,
                    attempt = backoff.attempt(),
                    delay_secs = delay.as_secs_f64(),
                    "Connection failed, retrying"
                );
                delay
            }
        };

        if sleep_or_shutdown(delay, &mut shutdown_rx).await {
            info!("Shutdown requested during backoff");
            return Ok(());
        }
    }
}
