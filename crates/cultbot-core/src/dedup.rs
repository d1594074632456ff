//! Guard against the platform delivering the same interaction twice.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// How long an interaction ID is remembered.
pub const DEFAULT_DEDUP_TTL: Duration = Duration::from_secs(15 * 60);

/// Remembers recently seen interaction IDs.
///
/// Uses the platform interaction ID as the dedup key. Entries older than the
/// TTL are dropped on the next insert.
pub struct DedupGuard {
    ttl: Duration,
    seen: Mutex<HashMap<u64, Instant>>,
}

impl DedupGuard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record `interaction_id` as seen.
    ///
    /// Returns `true` the first time an ID is seen within the TTL and
    /// `false` for a redelivery.
    pub fn first_delivery(&self, interaction_id: u64, now: Instant) -> bool {
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let ttl = self.ttl;
        seen.retain(|_, at| now.saturating_duration_since(*at) < ttl);

        if seen.contains_key(&interaction_id) {
            debug!(interaction_id, "Duplicate interaction detected");
            return false;
        }
        seen.insert(interaction_id, now);
        true
    }
}

impl Default for DedupGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_TTL)
    }
}
