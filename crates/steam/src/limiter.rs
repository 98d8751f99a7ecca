//! Sliding-window rate limiter shared by every store request in the process.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Permits at most `requests` acquisitions in any `window`.
///
/// Each caller reserves the earliest slot that keeps the window intact, then
/// sleeps until it without holding any lock. Slots are handed out in arrival
/// order, and a caller that gives up while waiting only wastes its own slot.
/// A [`penalize`](Self::penalize) call pauses every caller, including those
/// already waiting for a slot.
///
/// Cheap to clone; clones share the same window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    requests: usize,
    window: Duration,
    /// The most recent `requests` slots, oldest first. Slots may lie in the
    /// future.
    slots: Mutex<VecDeque<Instant>>,
    paused_until: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// `requests` is clamped to at least one.
    pub fn new(requests: u32, window: Duration) -> Self {
        let requests = usize::try_from(requests.max(1)).unwrap_or(usize::MAX);
        Self {
            inner: Arc::new(Inner {
                requests,
                window,
                slots: Mutex::new(VecDeque::with_capacity(requests)),
                paused_until: Mutex::new(None),
            }),
        }
    }

    /// Average spacing between permits at full throughput.
    pub fn interval(&self) -> Duration {
        self.inner.window.div_f64(self.inner.requests as f64)
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        loop {
            let slot = self.reserve();
            let wait = slot.saturating_duration_since(Instant::now());
            if !wait.is_zero() {
                debug!(?wait, "waiting for rate limit");
                sleep_until(slot).await;
            }
            // A penalty issued while waiting pushes the caller back in line.
            match self.paused_until() {
                Some(until) if until > Instant::now() => continue,
                _ => return,
            }
        }
    }

    /// Claim the next free slot.
    fn reserve(&self) -> Instant {
        let earliest = match self.paused_until() {
            Some(until) => until.max(Instant::now()),
            None => Instant::now(),
        };
        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match slots.front() {
            // The new slot must be a full window after the slot `requests`
            // places before it.
            Some(oldest) if slots.len() >= self.inner.requests => earliest.max(*oldest + self.inner.window),
            _ => earliest,
        };
        slots.push_back(slot);
        while slots.len() > self.inner.requests {
            slots.pop_front();
        }
        slot
    }

    /// Pause all requests for `cool_off`, e.g. after the upstream answered
    /// 429. Overlapping penalties extend the pause; they never shorten it.
    pub fn penalize(&self, cool_off: Duration) {
        let until = Instant::now() + cool_off;
        let mut paused_until = self.inner.paused_until.lock().unwrap_or_else(PoisonError::into_inner);
        if paused_until.is_none_or(|current| current < until) {
            warn!(?cool_off, "pausing store requests");
            *paused_until = Some(until);
        }
    }

    fn paused_until(&self) -> Option<Instant> {
        *self.inner.paused_until.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
