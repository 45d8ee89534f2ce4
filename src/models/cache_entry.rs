use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::cache_entries)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub expires_at: NaiveDateTime,
}
