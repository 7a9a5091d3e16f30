use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe counters shared by the feed connector and the slippage monitor.
#[derive(Debug)]
pub struct FeedMetrics {
    // Feed
    messages_received: AtomicU64,
    snapshots_received: AtomicU64,
    updates_received: AtomicU64,
    changes_buffered: AtomicU64,
    parse_errors: AtomicU64,
    feed_errors: AtomicU64,

    // Connection
    websocket_errors: AtomicU64,
    connection_failures: AtomicU64,
    reconnect_attempts: AtomicU64,
    reconnect_successes: AtomicU64,

    // Book / ticks
    entries_rejected: AtomicU64,
    ticks_completed: AtomicU64,
    partial_fills: AtomicU64,

    inner: RwLock<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    start_time: Instant,
    last_message_time: Option<Instant>,
    last_error_time: Option<Instant>,
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            snapshots_received: AtomicU64::new(0),
            updates_received: AtomicU64::new(0),
            changes_buffered: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            feed_errors: AtomicU64::new(0),
            websocket_errors: AtomicU64::new(0),
            connection_failures: AtomicU64::new(0),
            reconnect_attempts: AtomicU64::new(0),
            reconnect_successes: AtomicU64::new(0),
            entries_rejected: AtomicU64::new(0),
            ticks_completed: AtomicU64::new(0),
            partial_fills: AtomicU64::new(0),
            inner: RwLock::new(MetricsInner {
                start_time: Instant::now(),
                last_message_time: None,
                last_error_time: None,
            }),
        }
    }

    // --- Increment methods ---

    pub fn inc_messages_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.inner.write().last_message_time = Some(Instant::now());
    }

    pub fn inc_snapshots_received(&self) {
        self.snapshots_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_updates_received(&self) {
        self.updates_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_changes_buffered(&self, count: u64) {
        self.changes_buffered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_parse_errors(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        self.mark_error();
    }

    /// Error messages sent by the exchange itself.
    pub fn inc_feed_errors(&self) {
        self.feed_errors.fetch_add(1, Ordering::Relaxed);
        self.mark_error();
    }

    pub fn inc_websocket_errors(&self) {
        self.websocket_errors.fetch_add(1, Ordering::Relaxed);
        self.mark_error();
    }

    pub fn inc_connection_failures(&self) {
        self.connection_failures.fetch_add(1, Ordering::Relaxed);
        self.mark_error();
    }

    pub fn inc_reconnect_attempts(&self) {
        self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_reconnect_successes(&self) {
        self.reconnect_successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Malformed price/size entries skipped while applying to a book.
    pub fn add_entries_rejected(&self, count: u64) {
        if count > 0 {
            self.entries_rejected.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn inc_ticks_completed(&self) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_partial_fills(&self) {
        self.partial_fills.fetch_add(1, Ordering::Relaxed);
    }

    fn mark_error(&self) {
        self.inner.write().last_error_time = Some(Instant::now());
    }

    // --- Getter methods ---

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn snapshots_received(&self) -> u64 {
        self.snapshots_received.load(Ordering::Relaxed)
    }

    pub fn updates_received(&self) -> u64 {
        self.updates_received.load(Ordering::Relaxed)
    }

    pub fn changes_buffered(&self) -> u64 {
        self.changes_buffered.load(Ordering::Relaxed)
    }

    pub fn parse_errors(&self) -> u64 {
        self.parse_errors.load(Ordering::Relaxed)
    }

    pub fn feed_errors(&self) -> u64 {
        self.feed_errors.load(Ordering::Relaxed)
    }

    pub fn websocket_errors(&self) -> u64 {
        self.websocket_errors.load(Ordering::Relaxed)
    }

    pub fn connection_failures(&self) -> u64 {
        self.connection_failures.load(Ordering::Relaxed)
    }

    pub fn reconnect_attempts(&self) -> u64 {
        self.reconnect_attempts.load(Ordering::Relaxed)
    }

    pub fn reconnect_successes(&self) -> u64 {
        self.reconnect_successes.load(Ordering::Relaxed)
    }

    pub fn entries_rejected(&self) -> u64 {
        self.entries_rejected.load(Ordering::Relaxed)
    }

    pub fn ticks_completed(&self) -> u64 {
        self.ticks_completed.load(Ordering::Relaxed)
    }

    pub fn partial_fills(&self) -> u64 {
        self.partial_fills.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> f64 {
        self.inner.read().start_time.elapsed().as_secs_f64()
    }

    pub fn secs_since_last_message(&self) -> Option<f64> {
        self.inner
            .read()
            .last_message_time
            .map(|t| t.elapsed().as_secs_f64())
    }

    pub fn secs_since_last_error(&self) -> Option<f64> {
        self.inner
            .read()
            .last_error_time
            .map(|t| t.elapsed().as_secs_f64())
    }

    /// Feed messages per second since start.
    pub fn messages_per_second(&self) -> f64 {
        let uptime = self.uptime_secs();
        if uptime > 0.0 {
            self.messages_received() as f64 / uptime
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received(),
            snapshots_received: self.snapshots_received(),
            updates_received: self.updates_received(),
            changes_buffered: self.changes_buffered(),
            parse_errors: self.parse_errors(),
            feed_errors: self.feed_errors(),
            websocket_errors: self.websocket_errors(),
            connection_failures: self.connection_failures(),
            reconnect_attempts: self.reconnect_attempts(),
            reconnect_successes: self.reconnect_successes(),
            entries_rejected: self.entries_rejected(),
            ticks_completed: self.ticks_completed(),
            partial_fills: self.partial_fills(),
            uptime_secs: self.uptime_secs(),
            messages_per_second: self.messages_per_second(),
            secs_since_last_message: self.secs_since_last_message(),
            secs_since_last_error: self.secs_since_last_error(),
        }
    }
}

/// A point-in-time copy of the counters.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub snapshots_received: u64,
    pub updates_received: u64,
    pub changes_buffered: u64,
    pub parse_errors: u64,
    pub feed_errors: u64,
    pub websocket_errors: u64,
    pub connection_failures: u64,
    pub reconnect_attempts: u64,
    pub reconnect_successes: u64,
    pub entries_rejected: u64,
    pub ticks_completed: u64,
    pub partial_fills: u64,
    pub uptime_secs: f64,
    pub messages_per_second: f64,
    pub secs_since_last_message: Option<f64>,
    pub secs_since_last_error: Option<f64>,
}

/// Health of the market data feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Feed is quiet for longer than usual.
    Degraded,
    /// No feed data for an extended period.
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Degraded => write!(f, "DEGRADED"),
            HealthStatus::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

impl MetricsSnapshot {
    const STALE_THRESHOLD_SECS: f64 = 30.0;
    const UNHEALTHY_THRESHOLD_SECS: f64 = 60.0;

    /// Classifies by feed silence; before the first message, by uptime.
    pub fn health_status(&self) -> HealthStatus {
        let quiet_secs = self.secs_since_last_message.unwrap_or(self.uptime_secs);

        if quiet_secs > Self::UNHEALTHY_THRESHOLD_SECS {
            HealthStatus::Unhealthy
        } else if quiet_secs > Self::STALE_THRESHOLD_SECS {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn error_count(&self) -> u64 {
        self.parse_errors + self.feed_errors + self.websocket_errors + self.connection_failures
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Feed Metrics ===")?;
        writeln!(f, "Uptime:              {:.1}s", self.uptime_secs)?;
        writeln!(f, "Messages received:   {}", self.messages_received)?;
        writeln!(f, "Messages/sec:        {:.2}", self.messages_per_second)?;
        writeln!(f, "Snapshots:           {}", self.snapshots_received)?;
        writeln!(f, "Updates:             {}", self.updates_received)?;
        writeln!(f, "Changes buffered:    {}", self.changes_buffered)?;
        writeln!(f, "Entries rejected:    {}", self.entries_rejected)?;
        writeln!(f, "Ticks completed:     {}", self.ticks_completed)?;
        writeln!(f, "Partial fills:       {}", self.partial_fills)?;
        writeln!(f, "Parse errors:        {}", self.parse_errors)?;
        writeln!(f, "Feed errors:         {}", self.feed_errors)?;
        writeln!(f, "WebSocket errors:    {}", self.websocket_errors)?;
        writeln!(f, "Connection failures: {}", self.connection_failures)?;
        writeln!(f, "Reconnect attempts:  {}", self.reconnect_attempts)?;
        writeln!(f, "Reconnect successes: {}", self.reconnect_successes)?;
        if let Some(secs) = self.secs_since_last_message {
            writeln!(f, "Since last message:  {:.1}s", secs)?;
        }
        if let Some(secs) = self.secs_since_last_error {
            writeln!(f, "Since last error:    {:.1}s", secs)?;
        }
        Ok(())
    }
}

/// Shared handle to metrics.
pub type SharedMetrics = Arc<FeedMetrics>;

pub fn create_metrics() -> SharedMetrics {
    Arc::new(FeedMetrics::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_for(uptime_secs: f64, since_message: Option<f64>) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs,
            secs_since_last_message: since_message,
            ..Default::default()
        }
    }

    #[test]
    fn test_metrics_increment() {
        let metrics = FeedMetrics::new();

        metrics.inc_messages_received();
        metrics.inc_messages_received();
        metrics.inc_snapshots_received();
        metrics.add_changes_buffered(3);
        metrics.add_entries_rejected(0);
        metrics.add_entries_rejected(2);
        metrics.inc_partial_fills();

        assert_eq!(metrics.messages_received(), 2);
        assert_eq!(metrics.snapshots_received(), 1);
        assert_eq!(metrics.changes_buffered(), 3);
        assert_eq!(metrics.entries_rejected(), 2);
        assert_eq!(metrics.partial_fills(), 1);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = FeedMetrics::new();

        metrics.inc_updates_received();
        metrics.inc_websocket_errors();
        metrics.inc_parse_errors();
        metrics.inc_ticks_completed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.updates_received, 1);
        assert_eq!(snapshot.ticks_completed, 1);
        assert_eq!(snapshot.error_count(), 2);
        assert!(snapshot.secs_since_last_error.is_some());
        assert!(snapshot.uptime_secs >= 0.0);
    }

    #[test]
    fn test_last_message_time() {
        let metrics = FeedMetrics::new();
        assert!(metrics.secs_since_last_message().is_none());

        metrics.inc_messages_received();

        let secs = metrics.secs_since_last_message().unwrap();
        assert!(secs < 1.0);
    }

    #[test]
    fn test_health_status_recent_message() {
        assert_eq!(
            quiet_for(120.0, Some(5.0)).health_status(),
            HealthStatus::Healthy
        );
    }

    #[test]
    fn test_health_status_startup_without_messages() {
        assert_eq!(quiet_for(10.0, None).health_status(), HealthStatus::Healthy);
        assert_eq!(quiet_for(45.0, None).health_status(), HealthStatus::Degraded);
        assert_eq!(
            quiet_for(120.0, None).health_status(),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_health_status_boundaries() {
        // Thresholds are exclusive
        assert_eq!(
            quiet_for(120.0, Some(30.0)).health_status(),
            HealthStatus::Healthy
        );
        assert_eq!(
            quiet_for(120.0, Some(60.0)).health_status(),
            HealthStatus::Degraded
        );
        assert_eq!(
            quiet_for(300.0, Some(90.0)).health_status(),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_display_lists_counters() {
        let text = quiet_for(1.0, None).to_string();
        assert!(text.contains("Feed Metrics"));
        assert!(text.contains("Partial fills"));
        assert!(!text.contains("Since last message"));
    }
}
