use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::upsert::excluded;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    models::cache_entry::CacheEntry,
    repository::{CacheStore, DieselRepository},
};

impl CacheStore for DieselRepository {
    fn get_cache_value(&self, key: &str, now: NaiveDateTime) -> RepositoryResult<Option<String>> {
        use crate::schema::cache_entries;

        let mut conn = self.conn()?;
        let value = cache_entries::table
            .filter(cache_entries::key.eq(key))
            .filter(cache_entries::expires_at.gt(now))
            .select(cache_entries::value)
            .first::<String>(&mut conn)
            .optional()?;

        Ok(value)
    }

    fn put_cache_value(
        &self,
        key: &str,
        value: &str,
        now: NaiveDateTime,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        use crate::schema::cache_entries;

        let mut conn = self.conn()?;
        let entry = CacheEntry {
            key: key.to_string(),
            value: value.to_string(),
            expires_at,
        };

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let purged =
                diesel::delete(cache_entries::table.filter(cache_entries::expires_at.le(now)))
                    .execute(conn)?;
            if purged > 0 {
                log::debug!("Purged {purged} expired cache entries");
            }

            diesel::insert_into(cache_entries::table)
                .values(&entry)
                .on_conflict(cache_entries::key)
                .do_update()
                .set((
                    cache_entries::value.eq(excluded(cache_entries::value)),
                    cache_entries::expires_at.eq(excluded(cache_entries::expires_at)),
                ))
                .execute(conn)?;

            Ok(())
        })
    }

    fn insert_cache_value_if_absent(
        &self,
        key: &str,
        value: &str,
        now: NaiveDateTime,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        use crate::schema::cache_entries;

        let mut conn = self.conn()?;
        let entry = CacheEntry {
            key: key.to_string(),
            value: value.to_string(),
            expires_at,
        };

        conn.immediate_transaction::<bool, RepositoryError, _>(|conn| {
            diesel::delete(
                cache_entries::table
                    .filter(cache_entries::key.eq(key))
                    .filter(cache_entries::expires_at.le(now)),
            )
            .execute(conn)?;

            let inserted = diesel::insert_or_ignore_into(cache_entries::table)
                .values(&entry)
                .execute(conn)?;

            Ok(inserted == 1)
        })
    }

    fn delete_cache_value(&self, key: &str, value: &str) -> RepositoryResult<bool> {
        use crate::schema::cache_entries;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            cache_entries::table
                .filter(cache_entries::key.eq(key))
                .filter(cache_entries::value.eq(value)),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
