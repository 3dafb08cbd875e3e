//! # Gossip Message Dedup Cache
//!
//! Every message on the peer wire carries a `id: Uuid` (see
//! `shared_types::wire::WireMessage::id`). A node must not re-broadcast or
//! re-process a message id it has already seen.
//!
//! Two bounds are combined so the cache can never grow unbounded:
//!
//! - a time window, so ids age out once they are old enough that a
//!   legitimate re-send could not still be in flight
//! - a hard capacity with oldest-first eviction, so a burst of traffic
//!   faster than the garbage-collection interval still can't exhaust memory

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Errors from nonce cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NonceError {
    /// The nonce has already been used (replay attack).
    #[error("Nonce {nonce} has already been used (replay attack)")]
    NonceReused { nonce: Uuid },

    /// The message timestamp is too old.
    #[error("Message timestamp {timestamp} is too old (threshold: {threshold})")]
    MessageTooOld { timestamp: u64, threshold: u64 },

    /// The message timestamp is in the future.
    #[error("Message timestamp {timestamp} is in the future (threshold: {threshold})")]
    MessageFromFuture { timestamp: u64, threshold: u64 },
}

/// Time-bounded cache for replay prevention.
///
/// - Timestamp window: now - 60s to now + 10s
/// - Nonce validity: 120s (2x the timestamp window)
/// - Garbage collection: every 10s
pub struct TimeBoundedNonceCache {
    /// Map of nonce -> timestamp when nonce was first seen.
    cache: HashMap<Uuid, u64>,

    /// Nonce validity window in seconds (default: 120s = 2x message window).
    validity_window_secs: u64,

    /// Last garbage collection timestamp.
    last_gc: u64,

    /// Garbage collection interval in seconds.
    gc_interval_secs: u64,
}

impl TimeBoundedNonceCache {
    /// Default validity window: 2x the 60s message window.
    pub const DEFAULT_VALIDITY_WINDOW: u64 = 120;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: u64 = 10;

    /// Maximum past age for valid timestamps.
    pub const MAX_AGE: u64 = 60;

    /// Maximum future skew for valid timestamps.
    pub const MAX_FUTURE_SKEW: u64 = 10;

    /// Create a new nonce cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        let now = Self::current_timestamp();
        Self {
            cache: HashMap::new(),
            validity_window_secs: Self::DEFAULT_VALIDITY_WINDOW,
            last_gc: now,
            gc_interval_secs: Self::DEFAULT_GC_INTERVAL,
        }
    }

    /// Create a nonce cache with custom settings.
    #[must_use]
    pub fn with_config(validity_window_secs: u64, gc_interval_secs: u64) -> Self {
        let now = Self::current_timestamp();
        Self {
            cache: HashMap::new(),
            validity_window_secs,
            last_gc: now,
            gc_interval_secs,
        }
    }

    /// Validate timestamp and check/add nonce atomically.
    ///
    /// 1. timestamp check (rejects messages outside the valid window first)
    /// 2. periodic garbage collection
    /// 3. nonce check
    /// 4. add nonce
    ///
    /// # Errors
    ///
    /// - `NonceError::MessageTooOld` - timestamp older than 60s
    /// - `NonceError::MessageFromFuture` - timestamp more than 10s in future
    /// - `NonceError::NonceReused` - nonce has been seen before
    pub fn validate_and_add(&mut self, nonce: Uuid, timestamp: u64) -> Result<(), NonceError> {
        let now = Self::current_timestamp();

        let min_valid_timestamp = now.saturating_sub(Self::MAX_AGE);
        let max_valid_timestamp = now.saturating_add(Self::MAX_FUTURE_SKEW);

        if timestamp < min_valid_timestamp {
            return Err(NonceError::MessageTooOld {
                timestamp,
                threshold: min_valid_timestamp,
            });
        }

        if timestamp > max_valid_timestamp {
            return Err(NonceError::MessageFromFuture {
                timestamp,
                threshold: max_valid_timestamp,
            });
        }

        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if self.cache.contains_key(&nonce) {
            return Err(NonceError::NonceReused { nonce });
        }

        self.cache.insert(nonce, timestamp);

        Ok(())
    }

    /// Check if a nonce exists without adding it.
    #[must_use]
    pub fn contains(&self, nonce: &Uuid) -> bool {
        self.cache.contains_key(nonce)
    }

    /// Get the number of cached nonces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Remove expired nonces from the cache.
    fn garbage_collect(&mut self, now: u64) {
        let expiry_threshold = now.saturating_sub(self.validity_window_secs);
        self.cache.retain(|_, &mut ts| ts > expiry_threshold);
    }

    /// Get current Unix timestamp.
    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl Default for TimeBoundedNonceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded dedup cache for gossip message ids.
///
/// Unlike `TimeBoundedNonceCache`, entries here carry no signed timestamp of
/// their own — the only ordering available is arrival order — so expiry is
/// driven by a FIFO queue instead of a timestamp field. Both a time window
/// and a hard capacity bound the cache's size; whichever limit is hit first
/// evicts.
pub struct SeenMessageCache {
    seen: HashMap<Uuid, u64>,
    order: VecDeque<Uuid>,
    capacity: usize,
    ttl_secs: u64,
}

impl SeenMessageCache {
    /// Default maximum number of tracked ids.
    pub const DEFAULT_CAPACITY: usize = 100_000;

    /// Default time-to-live for a tracked id, in seconds.
    pub const DEFAULT_TTL_SECS: u64 = 600;

    /// Create a cache with the default capacity and TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_CAPACITY, Self::DEFAULT_TTL_SECS)
    }

    /// Create a cache with a custom capacity and TTL.
    #[must_use]
    pub fn with_config(capacity: usize, ttl_secs: u64) -> Self {
        Self {
            seen: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            ttl_secs,
        }
    }

    /// Record `id` as seen if it is new.
    ///
    /// Returns `true` if this is the first time `id` has been observed
    /// (caller should process/re-broadcast the message), `false` if it is
    /// a duplicate within the TTL window (caller should drop it).
    pub fn insert(&mut self, id: Uuid) -> bool {
        let now = Self::current_timestamp();
        self.evict_expired(now);

        if self.seen.contains_key(&id) {
            return false;
        }

        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(id, now);
        self.order.push_back(id);
        true
    }

    /// Check if `id` has already been seen, without recording it.
    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.seen.contains_key(id)
    }

    /// Number of ids currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the cache currently tracks no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn evict_expired(&mut self, now: u64) {
        let ttl = self.ttl_secs;
        while let Some(&front) = self.order.front() {
            let Some(&ts) = self.seen.get(&front) else {
                self.order.pop_front();
                continue;
            };
            if now.saturating_sub(ts) > ttl {
                self.order.pop_front();
                self.seen.remove(&front);
            } else {
                break;
            }
        }
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl Default for SeenMessageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> u64 {
        TimeBoundedNonceCache::current_timestamp()
    }

    #[test]
    fn test_valid_nonce() {
        let mut cache = TimeBoundedNonceCache::new();
        let nonce = Uuid::new_v4();
        let timestamp = now();

        assert!(cache.validate_and_add(nonce, timestamp).is_ok());
        assert!(cache.contains(&nonce));
    }

    #[test]
    fn test_duplicate_nonce_rejected() {
        let mut cache = TimeBoundedNonceCache::new();
        let nonce = Uuid::new_v4();
        let timestamp = now();

        assert!(cache.validate_and_add(nonce, timestamp).is_ok());

        let result = cache.validate_and_add(nonce, timestamp);
        assert!(matches!(result, Err(NonceError::NonceReused { .. })));
    }

    #[test]
    fn test_timestamp_too_old() {
        let mut cache = TimeBoundedNonceCache::new();
        let nonce = Uuid::new_v4();
        let old_timestamp = now().saturating_sub(120); // 2 minutes ago

        let result = cache.validate_and_add(nonce, old_timestamp);
        assert!(matches!(result, Err(NonceError::MessageTooOld { .. })));
    }

    #[test]
    fn test_timestamp_from_future() {
        let mut cache = TimeBoundedNonceCache::new();
        let nonce = Uuid::new_v4();
        let future_timestamp = now() + 60; // 1 minute in future

        let result = cache.validate_and_add(nonce, future_timestamp);
        assert!(matches!(result, Err(NonceError::MessageFromFuture { .. })));
    }

    #[test]
    fn test_timestamp_within_skew_allowed() {
        let mut cache = TimeBoundedNonceCache::new();

        // 5 seconds in future (within 10s skew)
        let nonce1 = Uuid::new_v4();
        let future_ok = now() + 5;
        assert!(cache.validate_and_add(nonce1, future_ok).is_ok());

        // 30 seconds in past (within 60s window)
        let nonce2 = Uuid::new_v4();
        let past_ok = now().saturating_sub(30);
        assert!(cache.validate_and_add(nonce2, past_ok).is_ok());
    }

    #[test]
    fn test_cache_length() {
        let mut cache = TimeBoundedNonceCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);

        let timestamp = now();
        for _ in 0..5 {
            let nonce = Uuid::new_v4();
            cache.validate_and_add(nonce, timestamp).unwrap();
        }

        assert_eq!(cache.len(), 5);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_custom_config() {
        let cache = TimeBoundedNonceCache::with_config(60, 5);
        assert_eq!(cache.validity_window_secs, 60);
        assert_eq!(cache.gc_interval_secs, 5);
    }

    #[test]
    fn test_seen_message_first_insert_reports_new() {
        let mut cache = SeenMessageCache::new();
        let id = Uuid::new_v4();
        assert!(cache.insert(id));
        assert!(cache.contains(&id));
    }

    #[test]
    fn test_seen_message_duplicate_insert_reports_seen() {
        let mut cache = SeenMessageCache::new();
        let id = Uuid::new_v4();
        assert!(cache.insert(id));
        assert!(!cache.insert(id));
    }

    #[test]
    fn test_seen_message_capacity_evicts_oldest() {
        let mut cache = SeenMessageCache::with_config(3, SeenMessageCache::DEFAULT_TTL_SECS);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();

        assert!(cache.insert(a));
        assert!(cache.insert(b));
        assert!(cache.insert(c));
        assert_eq!(cache.len(), 3);

        assert!(cache.insert(d));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&a));
        assert!(cache.contains(&d));
    }
}
