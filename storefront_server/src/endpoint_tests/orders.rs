use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use serde_json::Value;
use storefront_engine::{db_types::OrderStatusType, OrdersApi, RevenueApi};

use super::{
    helpers::{order_with_items, send_request},
    mocks::MockStorefront,
};
use crate::routes::{OrderByIdRoute, StoreOrdersRoute, StoreRevenueRoute};

fn configure_orders(db: MockStorefront) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(StoreOrdersRoute::<MockStorefront>::new())
            .service(OrderByIdRoute::<MockStorefront>::new())
            .app_data(web::Data::new(OrdersApi::new(db)));
    }
}

fn configure_revenue(db: MockStorefront, window_days: i64) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = RevenueApi::new(db).with_window(Duration::days(window_days));
        cfg.service(StoreRevenueRoute::<MockStorefront>::new()).app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn revenue_report() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_fetch_paid_orders_for_store()
        .withf(|store_id, since| {
            let expected = Utc::now() - Duration::days(30);
            store_id.as_str() == "s1" && (*since - expected).num_seconds().abs() < 60
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                order_with_items("o1", OrderStatusType::Paid, &[(1000, 1)]),
                order_with_items("o2", OrderStatusType::Paid, &[(500, 2), (1000, 1)]),
            ])
        });
    let req = TestRequest::get().uri("/admin/stores/s1/orders");
    let (status, body) = send_request(req, configure_revenue(db, 30)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["total_revenue"], 3000);
    assert_eq!(body["sales_count"], 2);
    assert_eq!(body["orders"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["orders"][1]["status"], "paid");
}

#[actix_web::test]
async fn revenue_for_store_without_sales() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_fetch_paid_orders_for_store().returning(|_, _| Ok(vec![]));
    let req = TestRequest::get().uri("/admin/stores/empty/orders");
    let (status, body) = send_request(req, configure_revenue(db, 365)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"orders":[],"total_revenue":0,"sales_count":0}"#);
}

#[actix_web::test]
async fn store_orders_are_paginated() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_fetch_orders_for_store()
        .withf(|store_id, page| store_id.as_str() == "s1" && page.offset() == 10 && page.limit() == 100)
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                order_with_items("o2", OrderStatusType::Pending, &[(1500, 1)]),
                order_with_items("o1", OrderStatusType::Paid, &[(500, 1)]),
            ])
        });
    let req = TestRequest::get().uri("/stores/s1/orders?offset=10&limit=500");
    let (status, body) = send_request(req, configure_orders(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body[0]["id"], "o2");
    assert_eq!(body[0]["status"], "pending");
    assert_eq!(body[0]["items"][0]["unit_price"], 1500);
}

#[actix_web::test]
async fn bad_pagination_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_fetch_orders_for_store().never();
    let req = TestRequest::get().uri("/stores/s1/orders?limit=lots");
    let (status, _) = send_request(req, configure_orders(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn order_by_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_fetch_order_by_id().returning(|id| {
        Ok((id.as_str() == "o1").then(|| order_with_items("o1", OrderStatusType::Paid, &[(2000, 1)])))
    });
    let (status, body) = send_request(TestRequest::get().uri("/orders/o1"), configure_orders(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], "o1");
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn missing_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, body) = send_request(TestRequest::get().uri("/orders/nope"), configure_orders(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order nope"}"#);
}
