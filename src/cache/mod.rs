//! Idempotency records and short-lived mutual-exclusion locks.
//!
//! Every backend is best-effort: failures are logged and degrade to "no
//! record" / "lock not granted". Callers must never rely on a lock for
//! correctness; the repository uniqueness check is the real guard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub mod database;
pub mod memory;
pub mod noop;

pub use database::DatabaseCache;
pub use memory::MemoryCache;
pub use noop::NoopCache;

/// Key/value cache with expiry used for idempotency and bill locks.
pub trait CacheGateway: Send + Sync {
    /// Stored result for an idempotency key, if it has not expired.
    fn check_key(&self, key: &str) -> Option<String>;
    /// Remember the result of a request under `key` for `ttl`.
    ///
    /// Backends also purge entries that have already expired.
    fn store_key(&self, key: &str, value: &str, ttl: Duration);
    /// Single non-blocking attempt to take the lock `key` for `ttl`,
    /// recording `token` as its owner.
    fn acquire(&self, key: &str, token: &str, ttl: Duration) -> bool;
    /// Drop the lock `key` if `token` still owns it. Returns whether it did.
    fn release(&self, key: &str, token: &str) -> bool;
}

static LOCK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Owner token unique across acquires in this process and, through the
/// process id and clock, across instances sharing a backend.
pub fn lock_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let sequence = LOCK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{nanos}-{sequence}", std::process::id())
}

/// Lock taken for the duration of one lifecycle operation.
///
/// Released on drop when the acquire succeeded. A guard whose lock expired
/// and was taken by someone else leaves the new owner's lock in place.
pub struct LockGuard<'a> {
    cache: &'a dyn CacheGateway,
    key: String,
    token: String,
    held: bool,
}

impl<'a> LockGuard<'a> {
    /// Attempt the lock once.
    pub fn try_acquire(cache: &'a dyn CacheGateway, key: String, ttl: Duration) -> Self {
        let token = lock_token();
        let held = cache.acquire(&key, &token, ttl);
        if !held {
            log::debug!("Lock {key} is held elsewhere, relying on the uniqueness check");
        }
        Self {
            cache,
            key,
            token,
            held,
        }
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if self.held && !self.cache.release(&self.key, &self.token) {
            log::debug!("Lock {} expired before release", self.key);
        }
    }
}

/// Lock protecting bill creation for one order.
pub fn order_lock_key(hub_id: i32, order_id: i32) -> String {
    format!("bill-lock:{hub_id}:order:{order_id}")
}

/// Lock protecting manual bill creation for one dining session.
pub fn session_lock_key(hub_id: i32, session_id: &str) -> String {
    format!("bill-lock:{hub_id}:session:{session_id}")
}

/// Idempotency record of a bill created from `order_id`.
pub fn order_idempotency_key(hub_id: i32, order_id: i32, client_key: &str) -> String {
    format!("idempotency:{hub_id}:order:{order_id}:{client_key}")
}

/// Idempotency record of a manual bill opened for `session_id`.
pub fn session_idempotency_key(hub_id: i32, session_id: &str, client_key: &str) -> String {
    format!("idempotency:{hub_id}:session:{session_id}:{client_key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_held_lock_on_drop() {
        let cache = MemoryCache::new();
        let key = order_lock_key(1, 7);

        {
            let guard = LockGuard::try_acquire(&cache, key.clone(), Duration::from_secs(5));
            assert!(guard.held);

            let second = LockGuard::try_acquire(&cache, key.clone(), Duration::from_secs(5));
            assert!(!second.held);
        }

        assert!(cache.acquire(&key, &lock_token(), Duration::from_secs(5)));
    }

    #[test]
    fn expired_guard_does_not_release_the_next_owner() {
        let cache = MemoryCache::new();
        let key = order_lock_key(1, 8);

        let first = LockGuard::try_acquire(&cache, key.clone(), Duration::ZERO);
        assert!(first.held);

        let second = LockGuard::try_acquire(&cache, key.clone(), Duration::from_secs(60));
        assert!(second.held);

        drop(first);
        assert!(!cache.acquire(&key, &lock_token(), Duration::from_secs(60)));

        drop(second);
        assert!(cache.acquire(&key, &lock_token(), Duration::from_secs(60)));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(lock_token(), lock_token());
    }

    #[test]
    fn keys_are_scoped_by_hub_and_target() {
        assert_eq!(order_lock_key(3, 9), "bill-lock:3:order:9");
        assert_eq!(session_lock_key(3, "s-1"), "bill-lock:3:session:s-1");
        assert_eq!(
            order_idempotency_key(3, 9, "abc"),
            "idempotency:3:order:9:abc"
        );
        assert_ne!(
            order_idempotency_key(1, 9, "abc"),
            order_idempotency_key(2, 9, "abc")
        );
        assert_ne!(
            order_idempotency_key(1, 9, "abc"),
            session_idempotency_key(1, "9", "abc")
        );
    }
}
