//! Request pacing for outbound service calls

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Enforces a minimum spacing between consecutive calls to one downstream
/// service.
///
/// [`acquire`](Self::acquire) suspends the caller until the spacing from the
/// previously permitted call has elapsed. The last-permit instant is read and
/// written under an async mutex that stays held across the wait, so two
/// callers racing `acquire` cannot both proceed inside the spacing window.
pub struct RateLimiter {
    min_interval: Duration,
    last_permit: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum spacing
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_permit: Mutex::new(None),
        }
    }

    /// Create a limiter with spacing in whole seconds
    pub fn with_spacing_secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Suspend until the next call is permitted.
    ///
    /// The recorded instant is the moment the call became permitted, not the
    /// moment the protected call finishes.
    pub async fn acquire(&self) {
        let mut last = self.last_permit.lock().await;
        let now = Instant::now();
        let permitted_at = match *last {
            Some(prev) => {
                let ready = prev + self.min_interval;
                if now < ready {
                    sleep_until(ready).await;
                    ready
                } else {
                    now
                }
            }
            None => now,
        };
        *last = Some(permitted_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::with_spacing_secs(1);
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_acquires_are_spaced() {
        let limiter = RateLimiter::with_spacing_secs(1);
        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire().await;
        }
        // 4 acquires => at least 3 full spacing intervals
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialized() {
        let limiter = Arc::new(RateLimiter::with_spacing_secs(1));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Racing callers must not both proceed within one spacing window
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_spacing_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
