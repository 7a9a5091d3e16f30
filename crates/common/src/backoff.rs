use rand::Rng;
use std::time::Duration;

/// Reconnect delay that doubles per attempt up to a cap, with symmetric jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial: Duration,
    cap: Duration,
    /// Fraction of the delay used as +/- jitter, clamped to `[0, 1]`.
    jitter: f64,
    attempt: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30), 0.1)
    }
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, cap: Duration, jitter: f64) -> Self {
        Self {
            initial,
            cap,
            jitter: jitter.clamp(0.0, 1.0),
            attempt: 0,
        }
    }

    /// Delay before the next attempt; advances the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let base = self
            .initial
            .checked_mul(1u32.checked_shl(self.attempt).unwrap_or(u32::MAX))
            .unwrap_or(self.cap)
            .min(self.cap);
        self.attempt = self.attempt.saturating_add(1);

        let spread = base.as_secs_f64() * self.jitter;
        if spread <= 0.0 {
            return base;
        }
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
    }

    /// Call once a connection has proven stable.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}
