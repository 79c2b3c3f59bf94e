use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Highest value the estimator reports on its own. The rest is reserved for
/// confirmed completion.
pub const ESTIMATE_CEILING: f32 = 89.9;

/// Largest single step of the estimate.
pub const MAX_INCREMENT: f32 = 10.0;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Approximates progress for a transfer that reports none.
pub struct ProgressEstimator<R = StdRng> {
    rng: R,
}

impl ProgressEstimator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for ProgressEstimator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ProgressEstimator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Next estimate after `current`. Never decreases and never reaches 90.
    pub fn next(&mut self, current: f32) -> f32 {
        if current >= ESTIMATE_CEILING {
            return current;
        }
        let increment = self.rng.gen_range(f32::EPSILON..=MAX_INCREMENT);
        (current + increment).min(ESTIMATE_CEILING)
    }
}

/// Periodic tick source for an estimator. Ticking ends when the handle is
/// stopped or dropped.
pub struct ProgressTicker<R = StdRng> {
    interval: Interval,
    estimator: ProgressEstimator<R>,
}

impl<R: Rng> ProgressTicker<R> {
    /// First tick fires one `period` after start.
    pub fn start(period: Duration, estimator: ProgressEstimator<R>) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            estimator,
        }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    pub fn estimator_mut(&mut self) -> &mut ProgressEstimator<R> {
        &mut self.estimator
    }

    pub fn stop(self) {}
}
