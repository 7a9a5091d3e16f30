//! Top-level monitor: one feed router and two tick schedulers.

use std::sync::Arc;

use connector_core::EventReceiver;
use metrics::SharedMetrics;
use model::Side;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::report::SlippageReport;
use crate::router::FeedRouter;
use crate::scheduler::TickScheduler;
use crate::side_book::SideBook;

/// Tracks buy and sell slippage for one product.
///
/// Feed events are routed on the caller's task. Each side is measured by its
/// own scheduler task, so the two sides never wait on each other.
pub struct SlippageMonitor {
    config: MonitorConfig,
    buy: Arc<SideBook>,
    sell: Arc<SideBook>,
    metrics: SharedMetrics,
}

impl SlippageMonitor {
    pub fn new(config: MonitorConfig, metrics: SharedMetrics) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            config,
            buy: Arc::new(SideBook::new(Side::Buy)),
            sell: Arc::new(SideBook::new(Side::Sell)),
            metrics,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn book(&self, side: Side) -> &Arc<SideBook> {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    fn spawn_scheduler(
        &self,
        side: Side,
        reports: &mpsc::Sender<SlippageReport>,
        shutdown_rx: &watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let scheduler = TickScheduler::new(
            Arc::clone(self.book(side)),
            self.config.tick_interval,
            self.config.trade_volume,
            self.metrics.clone(),
        );
        tokio::spawn(scheduler.run(reports.clone(), shutdown_rx.clone()))
    }

    /// Routes events and emits reports until shutdown.
    ///
    /// Returns [`MonitorError::ChannelClosed`] if the event channel closes
    /// before shutdown is signalled.
    pub async fn run(
        self,
        mut events: EventReceiver,
        reports: mpsc::Sender<SlippageReport>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), MonitorError> {
        info!(
            product_id = %self.config.product_id,
            tick_ms = self.config.tick_interval.as_millis() as u64,
            volume = %self.config.trade_volume,
            "starting slippage monitor"
        );

        let tickers = [
            self.spawn_scheduler(Side::Buy, &reports, &shutdown_rx),
            self.spawn_scheduler(Side::Sell, &reports, &shutdown_rx),
        ];
        drop(reports);

        let router = FeedRouter::new(
            self.config.product_id.clone(),
            Arc::clone(&self.buy),
            Arc::clone(&self.sell),
            self.metrics.clone(),
        );

        let result = loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("shutdown signal received");
                        break Ok(());
                    }
                }

                event = events.recv() => match event {
                    Some(event) => router.route(event),
                    None => {
                        warn!("feed event channel closed");
                        break Err(MonitorError::ChannelClosed);
                    }
                }
            }
        };

        for ticker in tickers {
            ticker.abort();
            let _ = ticker.await;
        }

        info!("slippage monitor stopped");
        result
    }
}
