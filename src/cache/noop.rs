use std::time::Duration;

use crate::cache::CacheGateway;

/// Degraded gateway: locks are always granted and nothing is remembered.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl CacheGateway for NoopCache {
    fn check_key(&self, _key: &str) -> Option<String> {
        None
    }

    fn store_key(&self, _key: &str, _value: &str, _ttl: Duration) {}

    fn acquire(&self, _key: &str, _token: &str, _ttl: Duration) -> bool {
        true
    }

    fn release(&self, _key: &str, _token: &str) -> bool {
        true
    }
}
