use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::bill::{
        Bill as DomainBill, BillInsert, BillListQuery, BillSave, BillStatus,
        NewBill as DomainNewBill,
    },
    domain::order::OrderMirror as DomainOrderMirror,
    models::bill::{Bill as DbBill, NewBill as DbNewBill, SaveBill as DbSaveBill},
    models::order::{NewOrderItem as DbNewOrderItem, OrderMirror as DbOrderMirror},
    repository::{BillReader, BillWriter, DieselRepository},
};

fn active_statuses() -> Vec<&'static str> {
    BillStatus::ACTIVE.iter().map(|status| (*status).into()).collect()
}

fn find_active_for_order(
    conn: &mut SqliteConnection,
    hub_id: i32,
    order_id: i32,
) -> QueryResult<Option<DbBill>> {
    use crate::schema::bills;

    bills::table
        .filter(bills::hub_id.eq(hub_id))
        .filter(bills::order_id.eq(order_id))
        .filter(bills::status.eq_any(active_statuses()))
        .order(bills::id.desc())
        .first::<DbBill>(conn)
        .optional()
}

fn find_active_for_session(
    conn: &mut SqliteConnection,
    hub_id: i32,
    session_id: &str,
) -> QueryResult<Option<DbBill>> {
    use crate::schema::bills;

    bills::table
        .filter(bills::hub_id.eq(hub_id))
        .filter(bills::order_id.is_null())
        .filter(bills::session_id.eq(session_id))
        .filter(bills::status.eq_any(active_statuses()))
        .order(bills::id.desc())
        .first::<DbBill>(conn)
        .optional()
}

/// Active bill other than `bill` in the same order or manual session scope.
fn find_other_active(
    conn: &mut SqliteConnection,
    bill: &DomainBill,
) -> QueryResult<Option<DbBill>> {
    use crate::schema::bills;

    let scoped = bills::table
        .filter(bills::hub_id.eq(bill.hub_id))
        .filter(bills::id.ne(bill.id))
        .filter(bills::status.eq_any(active_statuses()))
        .into_boxed::<diesel::sqlite::Sqlite>();

    let scoped = match (bill.order_id, bill.session_id.as_deref()) {
        (Some(order_id), _) => scoped.filter(bills::order_id.eq(order_id)),
        (None, Some(session_id)) => scoped
            .filter(bills::order_id.is_null())
            .filter(bills::session_id.eq(session_id)),
        (None, None) => return Ok(None),
    };

    scoped.order(bills::id.desc()).first::<DbBill>(conn).optional()
}

fn into_domain(bill: Option<DbBill>) -> QueryResult<Option<DomainBill>> {
    bill.map(DomainBill::try_from).transpose()
}

impl BillReader for DieselRepository {
    fn get_bill_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainBill>> {
        use crate::schema::bills;

        let mut conn = self.conn()?;
        let bill = bills::table
            .filter(bills::id.eq(id))
            .filter(bills::hub_id.eq(hub_id))
            .first::<DbBill>(&mut conn)
            .optional()?;

        Ok(into_domain(bill)?)
    }

    fn find_active_bill_for_order(
        &self,
        hub_id: i32,
        order_id: i32,
    ) -> RepositoryResult<Option<DomainBill>> {
        let mut conn = self.conn()?;
        let bill = find_active_for_order(&mut conn, hub_id, order_id)?;
        Ok(into_domain(bill)?)
    }

    fn find_active_bill_for_session(
        &self,
        hub_id: i32,
        session_id: &str,
    ) -> RepositoryResult<Option<DomainBill>> {
        let mut conn = self.conn()?;
        let bill = find_active_for_session(&mut conn, hub_id, session_id)?;
        Ok(into_domain(bill)?)
    }

    fn list_bills(&self, query: BillListQuery) -> RepositoryResult<(usize, Vec<DomainBill>)> {
        use crate::schema::bills;

        let mut conn = self.conn()?;

        let BillListQuery {
            hub_id,
            statuses,
            table_id,
            session_id,
            pagination,
        } = query;

        let status_filter: Vec<&'static str> =
            statuses.into_iter().map(Into::into).collect();

        let filtered = || {
            let mut boxed = bills::table
                .filter(bills::hub_id.eq(hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if !status_filter.is_empty() {
                boxed = boxed.filter(bills::status.eq_any(status_filter.clone()));
            }

            if let Some(table_id) = table_id {
                boxed = boxed.filter(bills::table_id.eq(Some(table_id)));
            }

            if let Some(ref session_id) = session_id {
                boxed = boxed.filter(bills::session_id.eq(Some(session_id.clone())));
            }

            boxed
        };

        let total = filtered().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered().order((bills::updated_at.desc(), bills::id.desc()));

        if let Some(pagination) = pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let bills = items
            .load::<DbBill>(&mut conn)?
            .into_iter()
            .map(DomainBill::try_from)
            .collect::<QueryResult<Vec<_>>>()?;

        Ok((total, bills))
    }
}

impl BillWriter for DieselRepository {
    fn insert_bill_if_absent(&self, new_bill: &DomainNewBill) -> RepositoryResult<BillInsert> {
        use crate::schema::bills;

        let mut conn = self.conn()?;

        // The immediate transaction takes the write lock up front, so no
        // other writer can slip an active bill in between check and insert.
        conn.immediate_transaction::<BillInsert, RepositoryError, _>(|conn| {
            let existing = match (new_bill.order_id, new_bill.session_id.as_deref()) {
                (Some(order_id), _) => find_active_for_order(conn, new_bill.hub_id, order_id)?,
                (None, Some(session_id)) => {
                    find_active_for_session(conn, new_bill.hub_id, session_id)?
                }
                (None, None) => None,
            };

            if let Some(existing) = existing {
                return Ok(BillInsert::Existing(existing.try_into()?));
            }

            let db_new = DbNewBill::from(new_bill);
            let created = diesel::insert_into(bills::table)
                .values(&db_new)
                .get_result::<DbBill>(conn)?;

            Ok(BillInsert::Created(created.try_into()?))
        })
    }

    fn save_bill(
        &self,
        bill: &DomainBill,
        mirror: Option<&DomainOrderMirror>,
    ) -> RepositoryResult<BillSave> {
        use crate::schema::{bills, order_items, orders};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<BillSave, RepositoryError, _>(|conn| {
            let stored_version = bills::table
                .filter(bills::id.eq(bill.id))
                .filter(bills::hub_id.eq(bill.hub_id))
                .select(bills::version)
                .first::<i32>(conn)
                .optional()?;

            let Some(stored_version) = stored_version else {
                return Err(RepositoryError::NotFound);
            };

            if stored_version != bill.version {
                return Ok(BillSave::Stale);
            }

            // Checked under the write lock so a bill created since the caller
            // read this one cannot collide with it on the unique index.
            if bill.status.is_active() {
                if let Some(other) = find_other_active(conn, bill)? {
                    return Ok(BillSave::Conflict(other.try_into()?));
                }
            }

            if let Some(mirror) = mirror {
                let order_version = orders::table
                    .filter(orders::id.eq(mirror.order_id))
                    .filter(orders::hub_id.eq(mirror.hub_id))
                    .select(orders::version)
                    .first::<i32>(conn)
                    .optional()?;

                match order_version {
                    None => return Err(RepositoryError::NotFound),
                    Some(version) if version != mirror.expected_version => {
                        return Ok(BillSave::Stale);
                    }
                    Some(_) => {}
                }

                diesel::update(
                    orders::table
                        .filter(orders::id.eq(mirror.order_id))
                        .filter(orders::hub_id.eq(mirror.hub_id))
                        .filter(orders::version.eq(mirror.expected_version)),
                )
                .set(&DbOrderMirror::from(mirror))
                .execute(conn)?;

                diesel::delete(order_items::table.filter(order_items::order_id.eq(mirror.order_id)))
                    .execute(conn)?;

                if !mirror.items.is_empty() {
                    let payload: Vec<DbNewOrderItem> = mirror
                        .items
                        .iter()
                        .map(|item| {
                            DbNewOrderItem::from_domain(mirror.order_id, item, mirror.updated_at)
                        })
                        .collect();

                    diesel::insert_into(order_items::table)
                        .values(&payload)
                        .execute(conn)?;
                }
            }

            let saved = diesel::update(
                bills::table
                    .filter(bills::id.eq(bill.id))
                    .filter(bills::hub_id.eq(bill.hub_id))
                    .filter(bills::version.eq(bill.version)),
            )
            .set(&DbSaveBill::from(bill))
            .get_result::<DbBill>(conn)?;

            Ok(BillSave::Saved(saved.try_into()?))
        })
    }
}
