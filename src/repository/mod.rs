use chrono::NaiveDateTime;
use diesel::RunQueryDsl;
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::bill::{Bill, BillInsert, BillListQuery, BillSave, NewBill};
use crate::domain::event::{BusMessage, StoredBusEvent};
use crate::domain::order::{NewOrder, Order, OrderListQuery, OrderMirror};
use crate::domain::pricing::{NewPricingConfig, PricingConfig, TenantSettings};
use crate::domain::table::{DiningTable, NewDiningTable};

pub mod bill;
pub mod bus_event;
pub mod cache_entry;
pub mod order;
pub mod pricing;
pub mod table;

#[cfg(test)]
pub mod mock;

/// How long a connection waits on a write lock held by another connection.
const BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        let mut conn = self.pool.get()?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .execute(&mut conn)?;
        Ok(conn)
    }
}

/// Read-only operations over orders.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Order>>;
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
}

/// Write operations over orders.
pub trait OrderWriter {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
}

/// Read-only operations over dining tables.
pub trait TableReader {
    fn get_table_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DiningTable>>;
}

/// Write operations over dining tables.
pub trait TableWriter {
    fn create_table(&self, new_table: &NewDiningTable) -> RepositoryResult<DiningTable>;
}

/// Read-only access to a hub's pricing records.
pub trait PricingReader {
    /// All pricing versions of a hub in the order they were appended.
    fn list_pricing_configs(&self, hub_id: i32) -> RepositoryResult<Vec<PricingConfig>>;
    fn get_tenant_settings(&self, hub_id: i32) -> RepositoryResult<Option<TenantSettings>>;
}

/// Write operations over a hub's pricing records.
pub trait PricingWriter {
    /// Append the next pricing version, deactivating the others when it is activated.
    fn create_pricing_config(&self, new_config: &NewPricingConfig)
    -> RepositoryResult<PricingConfig>;
    /// Activate one version and deactivate every other version of the hub.
    fn activate_pricing_config(&self, config_id: i32, hub_id: i32)
    -> RepositoryResult<PricingConfig>;
    fn save_tenant_settings(&self, settings: &TenantSettings) -> RepositoryResult<TenantSettings>;
}

/// Read-only operations over bills.
pub trait BillReader {
    fn get_bill_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<Bill>>;
    /// Draft or finalized bill created from `order_id`.
    fn find_active_bill_for_order(&self, hub_id: i32, order_id: i32)
    -> RepositoryResult<Option<Bill>>;
    /// Draft or finalized bill carrying `session_id`.
    fn find_active_bill_for_session(
        &self,
        hub_id: i32,
        session_id: &str,
    ) -> RepositoryResult<Option<Bill>>;
    fn list_bills(&self, query: BillListQuery) -> RepositoryResult<(usize, Vec<Bill>)>;
}

/// Write operations over bills.
pub trait BillWriter {
    /// Store the bill unless an active bill already exists for its order
    /// (or, without an order, for its session). Check and insert are atomic.
    fn insert_bill_if_absent(&self, new_bill: &NewBill) -> RepositoryResult<BillInsert>;
    /// Compare-and-swap save of `bill` against its `version`. With a mirror,
    /// the linked order is rewritten in the same transaction.
    fn save_bill(&self, bill: &Bill, mirror: Option<&OrderMirror>) -> RepositoryResult<BillSave>;
}

/// Shared key/value records with expiry, used for locks and idempotency.
pub trait CacheStore {
    fn get_cache_value(&self, key: &str, now: NaiveDateTime) -> RepositoryResult<Option<String>>;
    /// Upsert `key`, purging every entry that expired by `now`.
    fn put_cache_value(
        &self,
        key: &str,
        value: &str,
        now: NaiveDateTime,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<()>;
    /// Insert `key` unless a live entry exists. Returns whether it was inserted.
    fn insert_cache_value_if_absent(
        &self,
        key: &str,
        value: &str,
        now: NaiveDateTime,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<bool>;
    /// Remove `key` only while it still holds `value`. Returns whether it did.
    fn delete_cache_value(&self, key: &str, value: &str) -> RepositoryResult<bool>;
}

/// Append-only log of published bus messages.
pub trait EventStore {
    fn append_bus_event(&self, channel: &str, message: &BusMessage) -> RepositoryResult<()>;
    fn list_bus_events(&self, after_id: i32, limit: i64) -> RepositoryResult<Vec<StoredBusEvent>>;
}
