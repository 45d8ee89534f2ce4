use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use serde::Deserialize;

use crate::domain::order::{Order, OrderListQuery};
use crate::repository::OrderReader;
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the orders listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub table_id: Option<i32>,
    pub session_id: Option<String>,
    /// Page number requested by the client.
    pub page: Option<usize>,
}

fn authorize(user: &AuthenticatedUser, hub_id: i32) -> ServiceResult<()> {
    if user.hub_id != hub_id {
        return Err(ServiceError::Unauthorized);
    }
    Ok(())
}

/// Read mirror of a single order.
pub fn load_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    hub_id: i32,
    order_id: i32,
) -> ServiceResult<Order>
where
    R: OrderReader + ?Sized,
{
    authorize(user, hub_id)?;

    repo.get_order_by_id(order_id, hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Orders of a hub filtered by table and dining session, newest first.
pub fn list_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    hub_id: i32,
    query: OrdersQuery,
) -> ServiceResult<Paginated<Order>>
where
    R: OrderReader + ?Sized,
{
    authorize(user, hub_id)?;

    let page = query.page.unwrap_or(1).max(1);
    let mut list_query = OrderListQuery::new(hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(table_id) = query.table_id {
        list_query = list_query.table_id(table_id);
    }
    if let Some(session_id) = query.session_id.as_deref() {
        list_query = list_query.session_id(session_id);
    }

    let (total, orders) = repo.list_orders(list_query).map_err(ServiceError::from)?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(orders, page, total_pages))
}
