use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::cache::CacheGateway;

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expires_at: Instant,
}

/// Process-local cache for single-instance deployments.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Slot>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn expiry(ttl: Duration) -> Instant {
        let now = Instant::now();
        now.checked_add(ttl).unwrap_or(now)
    }
}

impl CacheGateway for MemoryCache {
    fn check_key(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let slot = self.entries.get(key)?;
        if slot.expires_at > now {
            return Some(slot.value.clone());
        }
        drop(slot);
        self.entries.remove_if(key, |_, slot| slot.expires_at <= now);
        None
    }

    fn store_key(&self, key: &str, value: &str, ttl: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, slot| slot.expires_at > now);
        self.entries.insert(
            key.to_string(),
            Slot {
                value: value.to_string(),
                expires_at: Self::expiry(ttl),
            },
        );
    }

    fn acquire(&self, key: &str, token: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        let slot = Slot {
            value: token.to_string(),
            expires_at: Self::expiry(ttl),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().expires_at > now {
                    return false;
                }
                entry.insert(slot);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(slot);
                true
            }
        }
    }

    fn release(&self, key: &str, token: &str) -> bool {
        self.entries
            .remove_if(key, |_, slot| slot.value == token)
            .is_some()
    }
}
