//! Local order book sides and execution price estimation.
//!
//! Each [`BookSide`] holds the price levels for one side of one instrument in
//! a [`PriceLevelStore`] keyed by prices normalized to two decimals. Sides are
//! populated from raw feed strings, so malformed entries are skipped one by
//! one rather than failing a whole message.
//!
//! # Example
//!
//! ```rust
//! use model::{ChangeRecord, Side};
//! use orderbook::{slippage_pct, BookSide};
//! use rust_decimal_macros::dec;
//!
//! let mut asks = BookSide::new(Side::Sell);
//! asks.apply_snapshot(&[
//!     ("100.00".to_string(), "5".to_string()),
//!     ("101.00".to_string(), "10".to_string()),
//! ]);
//!
//! let before = asks.snapshot_copy();
//! asks.apply_changes(&[ChangeRecord::new(Side::Sell, "100.00", "0")]);
//!
//! let expected = before.estimate_fill(dec!(12)).unwrap();
//! let executed = asks.estimate_fill(dec!(12)).unwrap();
//! println!("slippage: {:.4} %", slippage_pct(expected.price(), executed.price()));
//! ```

mod book;
mod error;
mod level;
mod price;
mod pricing;
mod slippage;
mod store;

pub use book::{ApplyStats, BookSide};
pub use error::OrderBookError;
pub use level::{parse_level, parse_size, PriceLevel};
pub use price::{Price, PRICE_SCALE};
pub use pricing::{estimate_fill, FillEstimate};
pub use slippage::slippage_pct;
pub use store::{BTreeLevelStore, PriceLevelStore};
