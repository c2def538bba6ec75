use std::time::Duration;

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, QueryPayloadError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use chrono::Duration as ChronoDuration;
use log::*;
use storefront_engine::{
    events::EventProducers,
    CheckoutApi,
    OrdersApi,
    PaymentNotificationApi,
    RevenueApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::stripe::{create_logging_event_handlers, StripeGateway},
    routes::{health, webhook_service, CheckoutRoute, OrderByIdRoute, StoreOrdersRoute, StoreRevenueRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = StripeGateway::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = create_logging_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: StripeGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    info!("🪛️ Checkout redirects go to {}. Revenue window is {} days.", config.front_url, config.revenue_window_days);
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), gateway.clone(), config.front_url.clone(), producers.clone())
            .with_gateway_timeout(config.gateway_timeout);
        let notification_api = PaymentNotificationApi::new(db.clone(), producers.clone());
        let orders_api = OrdersApi::new(db.clone());
        let revenue_api = RevenueApi::new(db.clone()).with_window(ChronoDuration::days(config.revenue_window_days));
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("storefront::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(notification_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(revenue_api))
            .service(health)
            .service(CheckoutRoute::<SqliteDatabase, StripeGateway>::new())
            .service(StoreOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(StoreRevenueRoute::<SqliteDatabase>::new())
            .service(webhook_service::<SqliteDatabase>(&config.webhook))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejecting request with an invalid JSON body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    debug!("💻️ Rejecting request with an invalid query string. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}
