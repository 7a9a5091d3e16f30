use model::{BookSnapshot, BookUpdate, ChangeRecord, RawLevel, Side};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Raw Coinbase Exchange websocket message, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum CoinbaseMessageRaw {
    #[serde(rename = "snapshot")]
    Snapshot {
        product_id: String,
        /// `[price, size]` pairs, kept loose so one odd entry cannot fail the message.
        bids: Vec<Value>,
        asks: Vec<Value>,
    },
    #[serde(rename = "l2update")]
    L2Update {
        product_id: String,
        #[serde(default)]
        time: Option<String>,
        /// `[side, price, size]` triples.
        changes: Vec<Value>,
    },
    #[serde(rename = "subscriptions")]
    Subscriptions {
        #[serde(default)]
        channels: Vec<SubscribedChannelRaw>,
    },
    #[serde(rename = "heartbeat")]
    Heartbeat {
        #[serde(default)]
        product_id: Option<String>,
    },
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubscribedChannelRaw {
    Named { name: String },
    Bare(String),
}

impl SubscribedChannelRaw {
    fn into_name(self) -> String {
        match self {
            Self::Named { name } => name,
            Self::Bare(name) => name,
        }
    }
}

#[derive(Debug)]
pub enum ParsedMessage {
    Snapshot(BookSnapshot),
    Update(BookUpdate),
    /// Subscription confirmation listing the active channel names.
    Subscriptions(Vec<String>),
    Heartbeat { product_id: Option<String> },
    Error {
        message: String,
        reason: Option<String>,
    },
    Unknown,
}

/// Renders one array element as the raw string the book will parse.
///
/// Numbers keep their JSON text; a missing or null element becomes empty and
/// is rejected later like any other malformed value.
fn scalar(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn entry_items(entry: Value) -> std::vec::IntoIter<Value> {
    match entry {
        Value::Array(items) => items.into_iter(),
        _ => Vec::new().into_iter(),
    }
}

fn parse_levels(levels: Vec<Value>) -> Vec<RawLevel> {
    levels
        .into_iter()
        .map(|entry| {
            let mut items = entry_items(entry);
            let price = scalar(items.next());
            let size = scalar(items.next());
            (price, size)
        })
        .collect()
}

/// Converts `[side, price, size]` triples, dropping entries with an unknown side.
///
/// Price and size stay as strings; they are validated when the book applies them.
fn parse_changes(product_id: &str, changes: Vec<Value>) -> Vec<ChangeRecord> {
    changes
        .into_iter()
        .filter_map(|entry| {
            let mut items = entry_items(entry);
            let side = scalar(items.next());
            let price = scalar(items.next());
            let size = scalar(items.next());

            match side.parse::<Side>() {
                Ok(side) => Some(ChangeRecord { side, price, size }),
                Err(e) => {
                    warn!(product_id = %product_id, error = %e, "dropping change with unknown side");
                    None
                }
            }
        })
        .collect()
}

impl From<CoinbaseMessageRaw> for ParsedMessage {
    fn from(raw: CoinbaseMessageRaw) -> Self {
        match raw {
            CoinbaseMessageRaw::Snapshot {
                product_id,
                bids,
                asks,
            } => ParsedMessage::Snapshot(BookSnapshot {
                product_id,
                bids: parse_levels(bids),
                asks: parse_levels(asks),
            }),
            CoinbaseMessageRaw::L2Update {
                product_id,
                time,
                changes,
            } => {
                let changes = parse_changes(&product_id, changes);
                ParsedMessage::Update(BookUpdate {
                    product_id,
                    time,
                    changes,
                })
            }
            CoinbaseMessageRaw::Subscriptions { channels } => ParsedMessage::Subscriptions(
                channels
                    .into_iter()
                    .map(SubscribedChannelRaw::into_name)
                    .collect(),
            ),
            CoinbaseMessageRaw::Heartbeat { product_id } => ParsedMessage::Heartbeat { product_id },
            CoinbaseMessageRaw::Error { message, reason } => {
                ParsedMessage::Error { message, reason }
            }
            CoinbaseMessageRaw::Unknown => ParsedMessage::Unknown,
        }
    }
}

pub fn parse_message(text: &str) -> Result<ParsedMessage, serde_json::Error> {
    let raw: CoinbaseMessageRaw = serde_json::from_str(text)?;
    Ok(raw.into())
}
