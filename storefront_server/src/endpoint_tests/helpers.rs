use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use log::debug;
use storefront_engine::db_types::{
    Cents,
    NewOrder,
    Order,
    OrderItem,
    OrderStatusType,
    Product,
    Store,
};

use crate::server::{json_error_handler, query_error_handler};

/// Runs a single request through an app built by `configure`. Errors raised by middleware are rendered the same way
/// the server would render them.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.map_into_boxed_body().into_parts().1,
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let body = to_bytes(res.into_body()).await.map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default();
    (status, body)
}

pub fn store() -> Store {
    Store {
        id: "s1".into(),
        user_id: "owner-1".into(),
        name: "Acme".into(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    }
}

pub fn product(id: &str, store_id: &str, price: Option<i64>) -> Product {
    Product {
        id: id.into(),
        store_id: store_id.into(),
        name: format!("Product {id}"),
        price: price.map(Cents::from),
        published: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
    }
}

/// What the store would hand back after saving `order`.
pub fn stored_order(order: NewOrder) -> Order {
    let items = order
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| OrderItem {
            id: i as i64 + 1,
            order_id: order.id.clone(),
            product_id: item.product_id.clone(),
            product_name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            created_at: order.created_at,
        })
        .collect();
    Order {
        id: order.id,
        store_id: order.store_id,
        user_id: order.user_id,
        status: OrderStatusType::Pending,
        created_at: order.created_at,
        updated_at: order.created_at,
        items,
    }
}

/// An order with one item per `(unit price, quantity)` pair.
pub fn order_with_items(id: &str, status: OrderStatusType, lines: &[(i64, i64)]) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap();
    let items = lines
        .iter()
        .enumerate()
        .map(|(i, (price, qty))| OrderItem {
            id: i as i64 + 1,
            order_id: id.into(),
            product_id: format!("p{i}").into(),
            product_name: format!("Product p{i}"),
            unit_price: Cents::from(*price),
            quantity: *qty,
            created_at,
        })
        .collect();
    Order {
        id: id.into(),
        store_id: "s1".into(),
        user_id: "buyer-1".into(),
        status,
        created_at,
        updated_at: created_at,
        items,
    }
}
