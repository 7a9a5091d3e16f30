use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Book side. Bids are `Buy`, asks are `Sell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid side '{0}', expected 'buy' or 'sell'")]
pub struct ParseSideError(String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(Side::Buy),
            "sell" | "ask" => Ok(Side::Sell),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// Raw `(price, size)` strings as delivered by the feed.
///
/// Parsing is deferred until the level is applied to a book.
pub type RawLevel = (String, String);

/// A side-tagged absolute level change: "the level at `price` now holds `size`".
///
/// A size of zero removes the level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub side: Side,
    pub price: String,
    pub size: String,
}

impl ChangeRecord {
    pub fn new(side: Side, price: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            side,
            price: price.into(),
            size: size.into(),
        }
    }
}

/// Full book state for one product, delivered once per subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub product_id: String,
    pub bids: Vec<RawLevel>,
    pub asks: Vec<RawLevel>,
}

impl BookSnapshot {
    /// Levels that populate the given side.
    pub fn levels(&self, side: Side) -> &[RawLevel] {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }
}

/// Incremental level changes for one product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookUpdate {
    pub product_id: String,
    /// Exchange timestamp, as sent.
    pub time: Option<String>,
    pub changes: Vec<ChangeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeedEvent {
    Snapshot(BookSnapshot),
    Update(BookUpdate),
}
