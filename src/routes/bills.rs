use actix_web::{HttpRequest, HttpResponse, Responder, get, patch, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::repository::errors::RepositoryError;
use serde_json::json;

use crate::forms::bills::{
    ActiveBillsQuery, CreateBillFromOrderPayload, CreateManualBillPayload, HistoryQuery,
    UpdateBillPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{error_response, parse_path_id};
use crate::services::bills::{BillError, BillService};

/// Header carrying the client's idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

type Bills = web::Data<BillService<DieselRepository>>;

fn idempotency_key(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Map a lifecycle failure to its HTTP answer. Conflicts carry the bill
/// the client has to reconcile with.
pub fn bill_error_response(err: BillError, context: &str) -> HttpResponse {
    match err {
        BillError::Unauthorized => HttpResponse::Unauthorized().finish(),
        BillError::Validation(message) => error_response(HttpResponse::BadRequest(), message),
        BillError::NotFound(_) | BillError::Repository(RepositoryError::NotFound) => {
            error_response(HttpResponse::NotFound(), err.to_string())
        }
        BillError::NotEditable(_) => error_response(HttpResponse::Forbidden(), err.to_string()),
        BillError::Duplicate(ref bill) | BillError::ActiveBillExists(ref bill) => {
            HttpResponse::Conflict().json(json!({ "error": err.to_string(), "bill": bill }))
        }
        BillError::InvalidTransition { .. } | BillError::ConcurrentModification => {
            error_response(HttpResponse::Conflict(), err.to_string())
        }
        BillError::Computation(_) | BillError::Repository(_) => {
            log::error!("Failed to {context}: {err}");
            error_response(HttpResponse::InternalServerError(), "Internal server error")
        }
    }
}

#[post("/{tenant}/orders/{order_id}/bill")]
pub async fn create_bill_from_order(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    bills: Bills,
    web::Json(payload): web::Json<CreateBillFromOrderPayload>,
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

    let options = match payload.into_domain() {
        Ok(options) => options,
        Err(err) => return bill_error_response(err.into(), "create bill"),
    };
    let key = idempotency_key(&req);

    match bills.create_from_order(&user, hub_id, order_id, options, key.as_deref()) {
        Ok(bill) => HttpResponse::Created().json(bill),
        Err(err) => bill_error_response(err, "create bill from order"),
    }
}

#[post("/{tenant}/bills")]
pub async fn create_manual_bill(
    req: HttpRequest,
    path: web::Path<String>,
    user: AuthenticatedUser,
    bills: Bills,
    web::Json(payload): web::Json<CreateManualBillPayload>,
) -> impl Responder {
    let hub_id = match parse_path_id(&path.into_inner(), "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };

    let input = match payload.into_domain() {
        Ok(input) => input,
        Err(err) => return bill_error_response(err.into(), "create manual bill"),
    };
    let key = idempotency_key(&req);

    match bills.create_manual(&user, hub_id, input, key.as_deref()) {
        Ok(bill) => HttpResponse::Created().json(bill),
        Err(err) => bill_error_response(err, "create manual bill"),
    }
}

#[get("/{tenant}/bills/active")]
pub async fn list_active_bills(
    path: web::Path<String>,
    params: web::Query<ActiveBillsQuery>,
    user: AuthenticatedUser,
    bills: Bills,
) -> impl Responder {
    let hub_id = match parse_path_id(&path.into_inner(), "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let query = params.into_inner();

    match bills.list_active(&user, hub_id, query.table_id, query.session_id.as_deref()) {
        Ok(active) => HttpResponse::Ok().json(active),
        Err(err) => bill_error_response(err, "list active bills"),
    }
}

#[get("/{tenant}/bills/history")]
pub async fn list_bill_history(
    path: web::Path<String>,
    params: web::Query<HistoryQuery>,
    user: AuthenticatedUser,
    bills: Bills,
) -> impl Responder {
    let hub_id = match parse_path_id(&path.into_inner(), "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match bills.list_history(&user, hub_id, params.page.unwrap_or(1)) {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(err) => bill_error_response(err, "list bill history"),
    }
}

#[get("/{tenant}/bills/{bill_id}")]
pub async fn show_bill(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    bills: Bills,
) -> impl Responder {
    let (hub_id, bill_id) = match parse_bill_path(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match bills.get_bill(&user, hub_id, bill_id) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => bill_error_response(err, "load bill"),
    }
}

#[patch("/{tenant}/bills/{bill_id}")]
pub async fn update_bill(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    bills: Bills,
    web::Json(payload): web::Json<UpdateBillPayload>,
) -> impl Responder {
    let (hub_id, bill_id) = match parse_bill_path(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    let update = match payload.into_domain() {
        Ok(update) => update,
        Err(err) => return bill_error_response(err.into(), "update bill"),
    };

    match bills.update_draft(&user, hub_id, bill_id, update) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => bill_error_response(err, "update bill"),
    }
}

#[post("/{tenant}/bills/{bill_id}/finalize")]
pub async fn finalize_bill(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    bills: Bills,
) -> impl Responder {
    let (hub_id, bill_id) = match parse_bill_path(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match bills.finalize(&user, hub_id, bill_id) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => bill_error_response(err, "finalize bill"),
    }
}

#[post("/{tenant}/bills/{bill_id}/mark-paid")]
pub async fn mark_bill_paid(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    bills: Bills,
) -> impl Responder {
    let (hub_id, bill_id) = match parse_bill_path(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match bills.mark_paid(&user, hub_id, bill_id) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => bill_error_response(err, "mark bill paid"),
    }
}

#[post("/{tenant}/bills/{bill_id}/reopen")]
pub async fn reopen_bill(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    bills: Bills,
) -> impl Responder {
    let (hub_id, bill_id) = match parse_bill_path(path.into_inner()) {
        Ok(ids) => ids,
        Err(response) => return response,
    };

    match bills.reopen(&user, hub_id, bill_id) {
        Ok(bill) => HttpResponse::Ok().json(bill),
        Err(err) => bill_error_response(err, "reopen bill"),
    }
}

fn parse_bill_path((tenant, bill_id): (String, String)) -> Result<(i32, i32), HttpResponse> {
    Ok((
        parse_path_id(&tenant, "tenant")?,
        parse_path_id(&bill_id, "billId")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    use crate::domain::bill::BillStatus;
    use crate::services::totals::TotalsError;

    #[test]
    fn errors_map_to_status_codes() {
        let cases = [
            (BillError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                BillError::Validation("items[0] has no item identifier".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (BillError::NotFound("order"), StatusCode::NOT_FOUND),
            (
                BillError::Repository(RepositoryError::NotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                BillError::NotEditable(BillStatus::Paid),
                StatusCode::FORBIDDEN,
            ),
            (
                BillError::InvalidTransition {
                    from: BillStatus::Draft,
                    to: BillStatus::Paid,
                },
                StatusCode::CONFLICT,
            ),
            (BillError::ConcurrentModification, StatusCode::CONFLICT),
            (
                BillError::Computation(TotalsError::Overflow("subtotal")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(bill_error_response(err, "test").status(), status);
        }
    }

    #[actix_web::test]
    async fn validation_error_names_the_field() {
        let response = bill_error_response(
            BillError::Validation("items[2] has no item identifier".to_string()),
            "test",
        );

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "items[2] has no item identifier");
    }

    #[test]
    fn reads_idempotency_header() {
        let req = TestRequest::default()
            .insert_header((IDEMPOTENCY_HEADER, " abc-1 "))
            .to_http_request();
        assert_eq!(idempotency_key(&req).as_deref(), Some("abc-1"));

        let req = TestRequest::default().to_http_request();
        assert_eq!(idempotency_key(&req), None);
    }
}
