//! Order book error types.

use model::Side;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while parsing or pricing against a book.
///
/// None of these are fatal: malformed entries are skipped by the caller and
/// the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderBookError {
    /// Price is not a decimal, or normalizes to zero or below.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Size is not a decimal or is negative.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// Target trade volume must be positive.
    #[error("invalid trade volume: {0}")]
    InvalidVolume(Decimal),

    /// Pricing the book exceeded the decimal range.
    #[error("arithmetic overflow while pricing {0} units")]
    Overflow(Decimal),

    /// A change tagged for one side was applied to the other side's book.
    #[error("{found} change applied to {expected} book")]
    SideMismatch { expected: Side, found: Side },
}
