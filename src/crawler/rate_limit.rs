//! Per-host request spacing
//!
//! Each request reserves the next free slot for its host under the crawl-state
//! lock, then sleeps outside the lock until that slot arrives. Reservations are
//! spaced by at least the configured interval, so two requests to one host never
//! fire closer together than that, and hosts never wait on each other.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum spacing between requests to the same host
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Reserves the next request slot for `host`
    ///
    /// Must be called with the crawl-state lock held. Records the slot as the
    /// host's last request time and returns it; the caller sleeps until then.
    pub fn reserve(
        &self,
        last_request: &mut HashMap<String, Instant>,
        host: &str,
        now: Instant,
    ) -> Instant {
        let slot = match last_request.get(host) {
            Some(last) => (*last + self.interval).max(now),
            None => now,
        };
        last_request.insert(host.to_string(), slot);
        slot
    }

    /// Sleeps until a reserved slot, if it lies in the future
    pub async fn wait_until(&self, host: &str, slot: Instant) {
        let now = Instant::now();
        if slot > now {
            tracing::trace!("Rate limiting {} for {:?}", host, slot - now);
            tokio::time::sleep_until(slot).await;
        }
    }
}
