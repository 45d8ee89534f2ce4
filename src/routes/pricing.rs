use actix_web::{HttpResponse, Responder, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::pricing::CreatePricingConfigPayload;
use crate::repository::DieselRepository;
use crate::routes::{error_response, parse_path_id};
use crate::services::{ServiceError, pricing as pricing_service};

fn pricing_error_response(err: ServiceError, context: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::Form(message) => error_response(HttpResponse::BadRequest(), message),
        ServiceError::NotFound => {
            error_response(HttpResponse::NotFound(), "pricing config not found")
        }
        err => {
            log::error!("Failed to {context}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/{tenant}/pricing-configs")]
/// Every pricing version of the tenant, oldest first.
///
/// Users without the role stored in `crate::SERVICE_ACCESS_ROLE` receive a `401 Unauthorized` response.
pub async fn list_pricing_configs(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let hub_id = match parse_path_id(&path.into_inner(), "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match pricing_service::list_pricing_configs(repo.get_ref(), &user, hub_id) {
        Ok(configs) => HttpResponse::Ok().json(configs),
        Err(err) => pricing_error_response(err, "list pricing configs"),
    }
}

#[post("/{tenant}/pricing-configs")]
pub async fn create_pricing_config(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<CreatePricingConfigPayload>,
) -> impl Responder {
    let hub_id = match parse_path_id(&path.into_inner(), "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match pricing_service::create_pricing_config(repo.get_ref(), &user, hub_id, payload) {
        Ok(config) => HttpResponse::Created().json(config),
        Err(err) => pricing_error_response(err, "create pricing config"),
    }
}

#[post("/{tenant}/pricing-configs/{config_id}/activate")]
pub async fn activate_pricing_config(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (tenant, config_id) = path.into_inner();
    let hub_id = match parse_path_id(&tenant, "tenant") {
        Ok(id) => id,
        Err(response) => return response,
    };
    let config_id = match parse_path_id(&config_id, "configId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match pricing_service::activate_pricing_config(repo.get_ref(), &user, hub_id, config_id) {
        Ok(config) => HttpResponse::Ok().json(config),
        Err(err) => pricing_error_response(err, "activate pricing config"),
    }
}
