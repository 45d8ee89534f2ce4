use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};

use crate::cache::CacheGateway;
use crate::repository::CacheStore;

/// Cache shared by every instance connected to the same database.
#[derive(Debug, Clone)]
pub struct DatabaseCache<R> {
    repo: R,
}

impl<R> DatabaseCache<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_utc()
}

fn expiry(from: NaiveDateTime, ttl: Duration) -> NaiveDateTime {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(NaiveDateTime::MAX)
}

impl<R> CacheGateway for DatabaseCache<R>
where
    R: CacheStore + Send + Sync,
{
    fn check_key(&self, key: &str) -> Option<String> {
        match self.repo.get_cache_value(key, now()) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Cache lookup for {key} failed: {err}");
                None
            }
        }
    }

    fn store_key(&self, key: &str, value: &str, ttl: Duration) {
        let now = now();
        if let Err(err) = self.repo.put_cache_value(key, value, now, expiry(now, ttl)) {
            log::warn!("Cache store for {key} failed: {err}");
        }
    }

    fn acquire(&self, key: &str, token: &str, ttl: Duration) -> bool {
        let now = now();
        match self
            .repo
            .insert_cache_value_if_absent(key, token, now, expiry(now, ttl))
        {
            Ok(acquired) => acquired,
            Err(err) => {
                log::warn!("Lock acquire for {key} failed: {err}");
                false
            }
        }
    }

    fn release(&self, key: &str, token: &str) -> bool {
        match self.repo.delete_cache_value(key, token) {
            Ok(released) => released,
            Err(err) => {
                log::warn!("Lock release for {key} failed: {err}");
                false
            }
        }
    }
}
