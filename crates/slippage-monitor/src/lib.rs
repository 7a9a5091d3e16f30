//! Live slippage measurement for one product's level-2 book.
//!
//! This crate turns a stream of feed events into periodic per-side reports:
//!
//! - **FeedRouter**: Applies snapshots and queues raw changes by side
//! - **SideBook**: One side's live levels plus its pending-change buffer
//! - **TickScheduler**: Measures one side every tick interval
//! - **SlippageMonitor**: Wires the above together and runs them
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ FeedEvent   │────>│ FeedRouter   │────>│ SideBook (buy)   │<──┐
//! │ (connector) │     │ - snapshot   │     │ SideBook (sell)  │   │ tick()
//! └─────────────┘     │ - enqueue    │     └──────────────────┘   │
//!                     └──────────────┘                            │
//!                                          ┌──────────────────┐   │
//!                     SlippageReport <─────│ TickScheduler x2 │───┘
//!                                          └──────────────────┘
//! ```
//!
//! On each tick a side copies its book, applies the changes queued since the
//! last tick, and prices the configured volume against both states. The
//! percentage difference is the slippage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use slippage_monitor::{MonitorConfig, SlippageMonitor};
//!
//! let config = MonitorConfig::from_env()?;
//! let monitor = SlippageMonitor::new(config, metrics)?;
//!
//! monitor.run(event_rx, report_tx, shutdown_rx).await?;
//! ```

mod buffer;
mod config;
mod error;
mod monitor;
mod report;
mod router;
mod scheduler;
mod side_book;

pub use buffer::UpdateBuffer;
pub use config::MonitorConfig;
pub use error::{ConfigError, MonitorError};
pub use monitor::SlippageMonitor;
pub use report::{SlippageReport, DEFAULT_REPORT_PRECISION};
pub use router::FeedRouter;
pub use scheduler::TickScheduler;
pub use side_book::{SideBook, SnapshotOutcome};
