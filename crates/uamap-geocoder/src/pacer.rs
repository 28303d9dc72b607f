//! Request pacing for the geocoding loop.
//!
//! The public Nominatim instance bans clients that hammer it, so every
//! resolver call is gated by a [`Pacer`]. Pacing is unconditional: a fast
//! failure still consumes its slot.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Gate awaited before each outbound request.
pub trait Pacer: Send {
    /// Waits until the next request is allowed, then claims the slot.
    fn pace(&mut self) -> impl Future<Output = ()> + Send;
}

/// Allows at most one request per `interval`, measured start to start.
///
/// The first call returns immediately. Uses `tokio::time`, so tests running
/// on a paused clock advance virtually instead of sleeping.
#[derive(Debug, Clone)]
pub struct FixedIntervalPacer {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedIntervalPacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Forgets the previous slot so the next call is immediate again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Pacer for FixedIntervalPacer {
    async fn pace(&mut self) {
        if let Some(last) = self.last {
            let next = last + self.interval;
            if next > Instant::now() {
                tracing::trace!(wait_ms = (next - Instant::now()).as_millis(), "pacing");
                tokio::time::sleep_until(next).await;
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    async fn pace(&mut self) {}
}
