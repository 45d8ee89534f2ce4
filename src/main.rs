use std::sync::Arc;

use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::models::config::CommonServerConfig;

use tablebill::cache::{CacheGateway, DatabaseCache, MemoryCache, NoopCache};
use tablebill::config::{CacheBackend, EventBackend, ServerConfig};
use tablebill::events::{EventPublisher, InProcessBus, NoopPublisher, OutboxPublisher};
use tablebill::repository::DieselRepository;
use tablebill::routes::bills::{
    create_bill_from_order, create_manual_bill, finalize_bill, list_active_bills,
    list_bill_history, mark_bill_paid, reopen_bill, show_bill, update_bill,
};
use tablebill::routes::orders::{list_orders, show_order};
use tablebill::routes::pricing::{
    activate_pricing_config, create_pricing_config, list_pricing_configs,
};
use tablebill::services::bills::BillService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let secret_key = match &config.secret {
        Some(key) => Key::from(key.as_bytes()),
        None => Key::generate(),
    };

    let common_config = CommonServerConfig {
        secret: config.secret.clone().unwrap_or_default(),
        auth_service_url: config.auth_service_url.clone(),
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let cache: Arc<dyn CacheGateway> = match config.cache_backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Database => Arc::new(DatabaseCache::new(repo.clone())),
        CacheBackend::None => {
            log::warn!("Running without bill locks and idempotency records");
            Arc::new(NoopCache)
        }
    };

    let events: Arc<dyn EventPublisher> = match config.event_backend {
        EventBackend::Memory => Arc::new(InProcessBus::new(config.event_channel_capacity)),
        EventBackend::Database => Arc::new(OutboxPublisher::spawn(
            repo.clone(),
            config.event_channel_capacity,
        )),
        EventBackend::None => Arc::new(NoopPublisher),
    };

    let bills = web::Data::new(
        BillService::new(repo.clone())
            .with_cache(cache)
            .with_events(events)
            .with_settings(config.bills),
    );

    log::info!(
        "Starting on {}:{} (cache: {:?}, events: {:?})",
        config.address,
        config.port,
        config.cache_backend,
        config.event_backend
    );

    let domain = config.domain.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            // Static segments before `/{tenant}/bills/{bill_id}`.
            .service(list_active_bills)
            .service(list_bill_history)
            .service(create_bill_from_order)
            .service(create_manual_bill)
            .service(show_bill)
            .service(update_bill)
            .service(finalize_bill)
            .service(mark_bill_paid)
            .service(reopen_bill)
            .service(list_orders)
            .service(show_order)
            .service(list_pricing_configs)
            .service(create_pricing_config)
            .service(activate_pricing_config)
            .app_data(bills.clone())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(common_config.clone()))
    })
    .bind((config.address.clone(), config.port))?
    .run()
    .await
}
