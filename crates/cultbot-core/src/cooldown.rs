//! Per-user command cooldowns.
//!
//! Each user gets at most one live entry. Expired entries are treated as
//! absent when read and are physically removed by [`CooldownTracker::purge_expired`],
//! which the bot runs on a timer.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Default cooldown window between two commands from the same user.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// Longest window a tracker will hold; larger values are clamped.
pub const MAX_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    /// The action may proceed; a new window has been recorded.
    Allowed,
    /// The user must wait this many more seconds (rounded up, at least 1).
    Denied { seconds_remaining: u64 },
}

/// Tracks cooldown expiry per user.
pub struct CooldownTracker {
    window: Duration,
    expiries: Mutex<HashMap<u64, Instant>>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.min(MAX_COOLDOWN),
            expiries: Mutex::new(HashMap::new()),
        }
    }

    /// The configured cooldown window.
    pub fn window(&self) -> Duration {
        self.window
    }

    // Plain data: a poisoned lock is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<u64, Instant>> {
        self.expiries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check the user's cooldown and, if allowed, start a new window.
    ///
    /// Read and write happen under one lock with no suspension point, so two
    /// concurrent calls for the same user cannot both be allowed. A denied
    /// call leaves the existing expiry untouched.
    pub fn check_and_consume(&self, user_id: u64, now: Instant) -> Cooldown {
        let mut entries = self.entries();

        if let Some(&expiry) = entries.get(&user_id) {
            if expiry > now {
                let remaining = expiry - now;
                return Cooldown::Denied {
                    seconds_remaining: ceil_secs(remaining),
                };
            }
        }

        match now.checked_add(self.window) {
            Some(expiry) => {
                entries.insert(user_id, expiry);
            }
            None => warn!(user_id, "Cooldown expiry out of range, not recorded"),
        }
        Cooldown::Allowed
    }

    /// Remove every entry whose expiry is at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, expiry| *expiry > now);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Purged expired cooldowns");
        }
        removed
    }

    /// Number of entries physically present (live or not yet purged).
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_then_denied_then_allowed() {
        let tracker = CooldownTracker::new(Duration::from_secs(5));
        let t0 = Instant::now();

        assert_eq!(tracker.check_and_consume(1, t0), Cooldown::Allowed);
        assert_eq!(
            tracker.check_and_consume(1, t0 + Duration::from_secs(2)),
            Cooldown::Denied { seconds_remaining: 3 }
        );
        assert_eq!(
            tracker.check_and_consume(1, t0 + Duration::from_secs(5)),
            Cooldown::Allowed
        );
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let tracker = CooldownTracker::new(Duration::from_secs(u64::MAX));
        let t0 = Instant::now();

        assert_eq!(tracker.window(), MAX_COOLDOWN);
        assert_eq!(tracker.check_and_consume(1, t0), Cooldown::Allowed);
        assert_eq!(
            tracker.check_and_consume(1, t0 + Duration::from_secs(1)),
            Cooldown::Denied {
                seconds_remaining: MAX_COOLDOWN.as_secs() - 1
            }
        );
    }

    #[test]
    fn test_denied_does_not_extend_window() {
        let tracker = CooldownTracker::new(Duration::from_secs(5));
        let t0 = Instant::now();

        tracker.check_and_consume(1, t0);
        tracker.check_and_consume(1, t0 + Duration::from_secs(4));
        // Still expires at t0 + 5s, not t0 + 9s
        assert_eq!(
            tracker.check_and_consume(1, t0 + Duration::from_secs(5)),
            Cooldown::Allowed
        );
    }

    #[test]
    fn test_remaining_rounds_up() {
        let tracker = CooldownTracker::new(Duration::from_secs(5));
        let t0 = Instant::now();

        tracker.check_and_consume(1, t0);
        assert_eq!(
            tracker.check_and_consume(1, t0 + Duration::from_millis(4_900)),
            Cooldown::Denied { seconds_remaining: 1 }
        );
        assert_eq!(
            tracker.check_and_consume(1, t0 + Duration::from_millis(100)),
            Cooldown::Denied { seconds_remaining: 5 }
        );
    }

    #[test]
    fn test_users_are_independent() {
        let tracker = CooldownTracker::default();
        let now = Instant::now();

        assert_eq!(tracker.check_and_consume(1, now), Cooldown::Allowed);
        assert_eq!(tracker.check_and_consume(2, now), Cooldown::Allowed);
        assert!(matches!(
            tracker.check_and_consume(1, now),
            Cooldown::Denied { .. }
        ));
    }

    #[test]
    fn test_purge_removes_only_expired() {
        let tracker = CooldownTracker::new(Duration::from_secs(5));
        let t0 = Instant::now();

        tracker.check_and_consume(1, t0);
        tracker.check_and_consume(2, t0 + Duration::from_secs(3));
        assert_eq!(tracker.len(), 2);

        assert_eq!(tracker.purge_expired(t0 + Duration::from_secs(6)), 1);
        assert_eq!(tracker.len(), 1);
        assert!(matches!(
            tracker.check_and_consume(2, t0 + Duration::from_secs(6)),
            Cooldown::Denied { seconds_remaining: 2 }
        ));
    }

    #[test]
    fn test_concurrent_checks_allow_once() {
        use std::sync::Arc;

        let tracker = Arc::new(CooldownTracker::new(Duration::from_secs(60)));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || tracker.check_and_consume(7, now))
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| *c == Cooldown::Allowed)
            .count();
        assert_eq!(allowed, 1);
    }
}
