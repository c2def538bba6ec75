//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database and gateway call in here is therefore `async`.
use actix_web::{dev::HttpServiceFactory, get, web, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::{OrderId, StoreId},
    order_objects::{CheckoutRequest, Pagination},
    OrderManagement,
    OrdersApi,
    PaymentGateway,
    PaymentNotificationApi,
    RevenueApi,
    StorefrontDatabase,
};
use stripe_tools::StripeEvent;

use crate::{
    config::WebhookConfig,
    data_objects::{CheckoutResponse, JsonResponse},
    errors::ServerError,
    integrations::stripe::payment_event_from_stripe,
    middleware::SignatureMiddlewareFactory,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/stores/{store_id}/checkout" impl StorefrontDatabase, PaymentGateway);
/// Route handler for the checkout endpoint
///
/// The body is a [`CheckoutRequest`]: the buyer's user id and the list of product ids in the basket. Repeat a product
/// id to buy more than one. On success the order is stored as pending and the response (201) carries the order id
/// and the URL of the hosted payment page the buyer must be redirected to.
pub async fn checkout<B, G>(
    path: web::Path<StoreId>,
    body: web::Json<CheckoutRequest>,
    api: web::Data<storefront_engine::CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    let store_id = path.into_inner();
    let request = body.into_inner();
    debug!("💻️ POST checkout for store {store_id} with {} products", request.product_ids.len());
    let result = api.checkout(&store_id, request).await.map_err(|e| {
        if e.is_client_error() {
            debug!("💻️ Checkout for store {store_id} rejected. {e}");
        } else {
            warn!("💻️ Checkout for store {store_id} failed. {e}");
        }
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(CheckoutResponse::from(result)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(store_orders => Get "/stores/{store_id}/orders" impl OrderManagement);
pub async fn store_orders<B: OrderManagement>(
    path: web::Path<StoreId>,
    query: web::Query<Pagination>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let store_id = path.into_inner();
    let pagination = query.into_inner();
    debug!("💻️ GET orders for store {store_id}. Offset {}, limit {}", pagination.offset(), pagination.limit());
    let orders = api.orders_for_store(&store_id, &pagination).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrdersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id}");
    let order = api.order_by_id(&order_id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Revenue  ----------------------------------------------------
route!(store_revenue => Get "/admin/stores/{store_id}/orders" impl OrderManagement);
pub async fn store_revenue<B: OrderManagement>(
    path: web::Path<StoreId>,
    api: web::Data<RevenueApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let store_id = path.into_inner();
    debug!("💻️ GET revenue for store {store_id}");
    let report = api.revenue_for_store(&store_id).await?;
    Ok(HttpResponse::Ok().json(report))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(payment_webhook => Post "" impl OrderManagement);
/// Stripe webhook handler. Mounted by [`webhook_service`], which puts the signature check in front of it, so by the
/// time this runs the body is known to come from Stripe.
///
/// 2xx tells Stripe to stop redelivering. Unknown event types and duplicate completions are therefore successes.
pub async fn payment_webhook<B: OrderManagement>(
    body: web::Bytes,
    api: web::Data<PaymentNotificationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let event = StripeEvent::from_slice(body.as_ref()).map_err(|e| {
        warn!("💻️ Could not decode webhook payload. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    info!("💻️ Received webhook event {} ({})", event.id, event.event_type());
    let event = payment_event_from_stripe(event)?;
    let outcome = api.process_payment_event(event).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(outcome.describe())))
}

/// `POST /webhooks`, behind the signature middleware.
pub fn webhook_service<B: OrderManagement + 'static>(config: &WebhookConfig) -> impl HttpServiceFactory {
    web::scope("/webhooks").wrap(SignatureMiddlewareFactory::new(config)).service(PaymentWebhookRoute::<B>::new())
}
