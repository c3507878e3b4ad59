//! Rolling-window rate limiting behind an injected store.
//!
//! The store is a trait rather than a module-level map so that a
//! multi-instance deployment can plug in a shared backend; the bundled
//! [`InMemoryRateLimitStore`] covers a single process only, and its
//! per-process state silently fragments limits when horizontally
//! scaled. See DESIGN.md.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Result of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window (0 when denied).
    pub remaining: u32,
    /// Time until the window resets; drives the `Retry-After` header.
    pub retry_after: Duration,
}

/// Abstract rolling-window counter keyed by an arbitrary string
/// (the intake keys by normalized phone number).
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request against `key` and decide whether it is allowed
    /// under `limit` requests per `window`.
    async fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision;
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Single-process store backed by a mutex-guarded map.
///
/// Expired windows are dropped lazily on access.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        // Drop expired windows so the map does not grow unbounded.
        entries.retain(|_, entry| entry.reset_at > now);

        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            reset_at: now + window,
        });

        if entry.count >= limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after: entry.reset_at.saturating_duration_since(now),
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit - entry.count,
            retry_after: entry.reset_at.saturating_duration_since(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(300);

    #[tokio::test(start_paused = true)]
    async fn allows_up_to_limit_then_denies() {
        let store = InMemoryRateLimitStore::new();

        for expected_remaining in [2, 1, 0] {
            let decision = store.check("+254712345678", 3, WINDOW).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = store.check("+254712345678", 3, WINDOW).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after > Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_expiry() {
        let store = InMemoryRateLimitStore::new();

        for _ in 0..3 {
            store.check("key", 3, WINDOW).await;
        }
        assert!(!store.check("key", 3, WINDOW).await.allowed);

        tokio::time::advance(WINDOW + Duration::from_secs(1)).await;

        let decision = store.check("key", 3, WINDOW).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let store = InMemoryRateLimitStore::new();

        for _ in 0..3 {
            store.check("phone-a", 3, WINDOW).await;
        }

        assert!(!store.check("phone-a", 3, WINDOW).await.allowed);
        assert!(store.check("phone-b", 3, WINDOW).await.allowed);
    }
}
