use common::CoinbaseEnvironment;
use model::FeedEvent;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Connection closed")]
    ConnectionClosed,
}

/// Default level-2 channel name.
pub const DEFAULT_CHANNEL: &str = "level2";

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Products to subscribe to.
    pub product_ids: Vec<String>,
    /// Feed channels to subscribe to.
    pub channels: Vec<String>,
    /// Event channel buffer capacity.
    pub channel_capacity: usize,
    pub environment: CoinbaseEnvironment,
}

impl ConnectorConfig {
    pub fn for_product(product_id: impl Into<String>) -> Self {
        Self {
            product_ids: vec![product_id.into()],
            ..Self::default()
        }
    }

    /// Overrides the environment and channel from `COINBASE_ENVIRONMENT` and
    /// `COINBASE_CHANNEL` when set.
    pub fn with_env_overrides(mut self) -> Self {
        self.environment = CoinbaseEnvironment::from_env();
        if let Ok(channel) = std::env::var("COINBASE_CHANNEL") {
            let channel = channel.trim();
            if !channel.is_empty() {
                self.channels = vec![channel.to_string()];
            }
        }
        self
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            product_ids: vec!["BTC-USD".to_string()],
            channels: vec![DEFAULT_CHANNEL.to_string()],
            channel_capacity: 1024,
            environment: CoinbaseEnvironment::default(),
        }
    }
}

pub type EventSender = mpsc::Sender<FeedEvent>;
pub type EventReceiver = mpsc::Receiver<FeedEvent>;

pub fn create_event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity)
}
