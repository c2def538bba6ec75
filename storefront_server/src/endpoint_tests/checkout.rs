use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{Cents, ProductId},
    events::EventProducers,
    traits::{GatewayError, HostedSession},
    CheckoutApi,
};

use super::{
    helpers::{product, send_request, store, stored_order},
    mocks::{MockGateway, MockStorefront},
};
use crate::routes::CheckoutRoute;

fn configure(db: MockStorefront, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CheckoutApi::new(db, gateway, "http://localhost:3000/", EventProducers::default());
        cfg.service(CheckoutRoute::<MockStorefront, MockGateway>::new()).app_data(web::Data::new(api));
    }
}

fn checkout_request(store_id: &str, body: Value) -> TestRequest {
    TestRequest::post().uri(&format!("/stores/{store_id}/checkout")).set_json(body)
}

/// A catalog with a $15 t-shirt and a $5 mug in store s1, and a $9 poster in store s2.
fn catalog() -> MockStorefront {
    let mut db = MockStorefront::new();
    db.expect_fetch_store().returning(|id| Ok((id.as_str() == "s1").then(store)));
    db.expect_fetch_purchasable_product().returning(|id| {
        Ok(match id.as_str() {
            "tee" => Some(product("tee", "s1", Some(1500))),
            "mug" => Some(product("mug", "s1", Some(500))),
            "poster" => Some(product("poster", "s2", Some(900))),
            "draft" => Some(product("draft", "s1", None)),
            _ => None,
        })
    });
    db
}

#[actix_web::test]
async fn checkout_creates_order_and_returns_session_url() {
    let _ = env_logger::try_init().ok();
    let mut db = catalog();
    db.expect_insert_order_with_items()
        .withf(|order| {
            order.store_id.as_str() == "s1" &&
                order.user_id == "buyer-1" &&
                order.items.len() == 2 &&
                order.total_price() == Cents::from(3500)
        })
        .times(1)
        .returning(|order| Ok(stored_order(order)));
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_hosted_session()
        .withf(|req| {
            req.success_url == "http://localhost:3000/s1/cart?success=true" &&
                req.cancel_url == "http://localhost:3000/s1/cart?canceled=true" &&
                req.line_items.iter().map(|i| i.quantity).sum::<i64>() == 3
        })
        .times(1)
        .returning(|req| {
            Ok(HostedSession {
                session_id: "cs_test_1".into(),
                redirect_url: format!("https://pay.example.com/c/pay/{}", req.order_id),
            })
        });
    let body = json!({"user_id": "buyer-1", "product_ids": ["tee", "mug", "tee"]});
    let (status, body) = send_request(checkout_request("s1", body), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    let order_id = body["order_id"].as_str().unwrap();
    assert_eq!(order_id.len(), 36);
    assert_eq!(body["url"], format!("https://pay.example.com/c/pay/{order_id}"));
}

#[actix_web::test]
async fn unknown_product_is_rejected_without_writes() {
    let _ = env_logger::try_init().ok();
    let mut db = catalog();
    db.expect_insert_order_with_items().never();
    let mut gateway = MockGateway::new();
    gateway.expect_create_hosted_session().never();
    let body = json!({"user_id": "buyer-1", "product_ids": ["tee", "nope"]});
    let (status, body) = send_request(checkout_request("s1", body), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Product nope does not exist"}"#);
}

#[actix_web::test]
async fn unknown_store() {
    let _ = env_logger::try_init().ok();
    let mut db = catalog();
    db.expect_insert_order_with_items().never();
    let body = json!({"user_id": "buyer-1", "product_ids": ["tee"]});
    let (status, _) = send_request(checkout_request("s9", body), configure(db, MockGateway::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn product_from_another_store_or_without_price() {
    let _ = env_logger::try_init().ok();
    for product_id in ["poster", "draft"] {
        let mut db = catalog();
        db.expect_insert_order_with_items().never();
        let body = json!({"user_id": "buyer-1", "product_ids": ["tee", product_id]});
        let (status, _) = send_request(checkout_request("s1", body), configure(db, MockGateway::new())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{product_id} should have been refused");
    }
}

#[actix_web::test]
async fn empty_basket_and_bad_json() {
    let _ = env_logger::try_init().ok();
    let body = json!({"user_id": "buyer-1", "product_ids": []});
    let (status, _) = send_request(checkout_request("s1", body), configure(catalog(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({"user_id": "buyer-1", "product_ids": "tee"});
    let (status, body) = send_request(checkout_request("s1", body), configure(catalog(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#));
}

#[actix_web::test]
async fn gateway_failure_is_a_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let mut db = catalog();
    db.expect_insert_order_with_items().times(1).returning(|order| Ok(stored_order(order)));
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_hosted_session()
        .times(1)
        .returning(|_| Err(GatewayError::Rejected { status: 401, message: "Invalid API Key provided".into() }));
    let body = json!({"user_id": "buyer-1", "product_ids": [ProductId::from("mug")]});
    let (status, body) = send_request(checkout_request("s1", body), configure(db, gateway)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("the payment gateway failed"));
}
