use actix_web::{HttpResponse, Responder, get, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::repository::DieselRepository;
use crate::routes::{error_response, parse_path_id};
use crate::services::orders::{self as orders_service, OrdersQuery};
use crate::services::ServiceError;

#[get("/{tenant}/orders")]
/// Orders of the tenant, optionally narrowed to a table or dining session.
pub async fn list_orders(
    path: web::Path<String>,
    params: web::Query<OrdersQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let hub_id = match parse_path_id(&path.into_inner(), "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match orders_service::list_orders(repo.get_ref(), &user, hub_id, params.into_inner()) {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to list orders: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/{tenant}/orders/{order_id}")]
pub async fn show_order(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (tenant, order_id) = path.into_inner();
    let hub_id = match parse_path_id(&tenant, "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let order_id = match parse_path_id(&order_id, "orderId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match orders_service::load_order(repo.get_ref(), &user, hub_id, order_id) {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => error_response(HttpResponse::NotFound(), "order not found"),
        Err(err) => {
            log::error!("Failed to load order {order_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
