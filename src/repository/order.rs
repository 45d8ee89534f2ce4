use std::collections::HashMap;

use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::order::{NewOrder as DomainNewOrder, Order as DomainOrder, OrderListQuery},
    models::order::{
        NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, Order as DbOrder,
        OrderItem as DbOrderItem,
    },
    repository::{DieselRepository, OrderReader, OrderWriter},
};

pub(crate) fn load_order_items(
    conn: &mut SqliteConnection,
    order_id: i32,
) -> QueryResult<Vec<DbOrderItem>> {
    use crate::schema::order_items;

    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .filter(orders::hub_id.eq(hub_id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = load_order_items(&mut conn, order.id)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        let OrderListQuery {
            hub_id,
            table_id,
            session_id,
            status,
            pagination,
        } = query;

        let status_filter: Option<&'static str> = status.map(Into::into);

        let filtered = || {
            let mut boxed = orders::table
                .filter(orders::hub_id.eq(hub_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(table_id) = table_id {
                boxed = boxed.filter(orders::table_id.eq(Some(table_id)));
            }

            if let Some(ref session_id) = session_id {
                boxed = boxed.filter(orders::session_id.eq(session_id.clone()));
            }

            if let Some(status_value) = status_filter {
                boxed = boxed.filter(orders::status.eq(status_value));
            }

            boxed
        };

        let total = filtered().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered().order((orders::created_at.desc(), orders::id.desc()));

        if let Some(pagination) = pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_orders = items.load::<DbOrder>(&mut conn)?;
        if db_orders.is_empty() {
            return Ok((total, Vec::new()));
        }

        let order_ids: Vec<i32> = db_orders.iter().map(|order| order.id).collect();

        let mut items_by_order: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();

        let rows = order_items::table
            .filter(order_items::order_id.eq_any(&order_ids))
            .order(order_items::id.asc())
            .load::<DbOrderItem>(&mut conn)?;

        for item in rows {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let orders = db_orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                DomainOrder::from((order, items))
            })
            .collect();

        Ok((total, orders))
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let db_new = DbNewOrder::from(new_order);

            let created = diesel::insert_into(orders::table)
                .values(&db_new)
                .get_result::<DbOrder>(conn)?;

            let order_id = created.id;

            if !new_order.items.is_empty() {
                let payload: Vec<DbNewOrderItem> = new_order
                    .items
                    .iter()
                    .map(|item| DbNewOrderItem::from_domain(order_id, item, new_order.updated_at))
                    .collect();

                diesel::insert_into(order_items::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            let items = load_order_items(conn, order_id)?;

            Ok(DomainOrder::from((created, items)))
        })
    }
}
