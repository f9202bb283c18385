//! Request pacing
//!
//! A [`RateLimiter`] hands out time slots at least `interval` apart. Callers
//! sleep until their slot, and the sleep races a cancellation token so a
//! cancelled run stops waiting immediately.

use crate::ScrapeError;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Spaces out requests by a fixed interval
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,

    /// Earliest instant the next slot may start
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// Creates a limiter whose first slot is available immediately
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Creates a limiter as if a request had just been made
    ///
    /// The first slot opens one interval from now.
    pub fn primed(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(Instant::now() + interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reserves the next slot and waits for it
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The slot has started
    /// * `Err(ScrapeError::Cancelled)` - The token fired before or during the wait
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ScrapeError> {
        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let slot = self.reserve();
        if slot <= Instant::now() {
            return Ok(());
        }

        tracing::trace!("Waiting {:?} for next request slot", slot - Instant::now());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
            _ = tokio::time::sleep_until(slot) => Ok(()),
        }
    }

    /// Claims the next free slot, returning its start
    fn reserve(&self) -> Instant {
        let mut next_slot = self.next_slot.lock().unwrap_or_else(|e| e.into_inner());
        let slot = (*next_slot).max(Instant::now());
        *next_slot = slot + self.interval;
        slot
    }
}
