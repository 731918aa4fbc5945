//! Spacing between successive uploads.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use rand::Rng;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use shorts_media::wait_cancelled;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// How the upload loop waits between uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerMode {
    /// At most one upload per interval.
    Fixed(Duration),
    /// A random delay in `[min, max]` after each upload.
    Randomized { min: Duration, max: Duration },
    None,
}

impl PacerMode {
    /// Fixed seconds, or a randomized window when both bounds are given.
    /// A zero fixed delay disables pacing.
    pub fn from_secs(fixed: u64, window: Option<(u64, u64)>) -> Self {
        match window {
            Some((min, max)) => PacerMode::Randomized {
                min: Duration::from_secs(min.min(max)),
                max: Duration::from_secs(min.max(max)),
            },
            None if fixed == 0 => PacerMode::None,
            None => PacerMode::Fixed(Duration::from_secs(fixed)),
        }
    }
}

/// Owned by one upload loop. The first call to [`UploadPacer::wait`] returns
/// immediately; later calls wait according to the mode.
pub struct UploadPacer {
    mode: PacerMode,
    limiter: Option<DirectLimiter>,
    started: bool,
}

impl UploadPacer {
    pub fn new(mode: PacerMode) -> Self {
        let limiter = match mode {
            PacerMode::Fixed(period) => Quota::with_period(period).map(RateLimiter::direct),
            _ => None,
        };
        Self {
            mode,
            limiter,
            started: false,
        }
    }

    pub fn none() -> Self {
        Self::new(PacerMode::None)
    }

    pub fn mode(&self) -> PacerMode {
        self.mode
    }

    /// Delay chosen for the next wait, if any. The fixed mode is governed
    /// by the rate limiter instead.
    fn random_delay(&self) -> Option<Duration> {
        match self.mode {
            PacerMode::Randomized { min, max } if max > Duration::ZERO => {
                let secs = rand::rng().random_range(min.as_secs_f64()..=max.as_secs_f64());
                Some(Duration::from_secs_f64(secs))
            }
            _ => None,
        }
    }

    /// Wait until the next upload may start.
    pub async fn wait(&mut self) {
        let first = !self.started;
        self.started = true;

        if let Some(limiter) = &self.limiter {
            if !first {
                info!(mode = ?self.mode, "Waiting before next upload");
            }
            limiter.until_ready().await;
            return;
        }

        if first {
            return;
        }
        if let Some(delay) = self.random_delay() {
            info!(delay_secs = delay.as_secs(), "Waiting before next upload");
            tokio::time::sleep(delay).await;
        }
    }

    /// [`UploadPacer::wait`] raced against the cancel flag. Returns `false`
    /// when cancelled first.
    pub async fn wait_or_cancel(&mut self, cancel_rx: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = self.wait() => true,
            _ = wait_cancelled(cancel_rx) => false,
        }
    }
}
