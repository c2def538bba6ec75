use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use serde_json::json;
use storefront_common::Secret;
use storefront_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    traits::OrderStoreError,
    PaymentNotificationApi,
};
use stripe_tools::webhook::{signature_header, SIGNATURE_HEADER};

use super::{
    helpers::{order_with_items, send_request},
    mocks::MockStorefront,
};
use crate::{config::WebhookConfig, routes::webhook_service};

const SECRET: &str = "whsec_endpoint_test_secret";

fn configure(db: MockStorefront) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let config = WebhookConfig::new(Secret::new(SECRET.to_string()));
        cfg.service(webhook_service::<MockStorefront>(&config))
            .app_data(web::Data::new(PaymentNotificationApi::new(db, EventProducers::default())));
    }
}

fn completed_event(order_id: Option<&str>) -> String {
    let metadata = match order_id {
        Some(id) => json!({ "order_id": id }),
        None => json!({}),
    };
    json!({
        "id": "evt_1PQ",
        "object": "event",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_a1",
            "object": "checkout.session",
            "payment_status": "paid",
            "amount_total": 2000,
            "currency": "usd",
            "metadata": metadata
        }}
    })
    .to_string()
}

fn signed_request(body: &str, timestamp: i64) -> TestRequest {
    let header = signature_header(SECRET, timestamp, body.as_bytes()).unwrap();
    TestRequest::post()
        .uri("/webhooks")
        .insert_header(("content-type", "application/json"))
        .insert_header((SIGNATURE_HEADER, header))
        .set_payload(body.to_string())
}

/// A store that must not be touched.
fn untouched_db() -> MockStorefront {
    let mut db = MockStorefront::new();
    db.expect_mark_paid_if_pending().never();
    db.expect_fetch_order_by_id().never();
    db
}

#[actix_web::test]
async fn missing_signature_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/webhooks").set_payload(completed_event(Some("o1")));
    let (status, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn tampered_body_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let header = signature_header(SECRET, Utc::now().timestamp(), completed_event(Some("o1")).as_bytes()).unwrap();
    let req = TestRequest::post()
        .uri("/webhooks")
        .insert_header((SIGNATURE_HEADER, header))
        .set_payload(completed_event(Some("o2")));
    let (status, body) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Signature verification failed"));
}

#[actix_web::test]
async fn wrong_secret_or_stale_timestamp_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let body = completed_event(Some("o1"));
    let header = signature_header("whsec_someone_else", Utc::now().timestamp(), body.as_bytes()).unwrap();
    let req = TestRequest::post().uri("/webhooks").insert_header((SIGNATURE_HEADER, header)).set_payload(body.clone());
    let (status, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = signed_request(&body, Utc::now().timestamp() - 3600);
    let (status, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn oversized_body_is_refused() {
    let _ = env_logger::try_init().ok();
    let body = format!(r#"{{"id":"evt_big","type":"invoice.paid","data":{{"object":{{"pad":"{}"}}}}}}"#, "x".repeat(70_000));
    let (status, _) = send_request(signed_request(&body, Utc::now().timestamp()), configure(untouched_db())).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_web::test]
async fn completed_checkout_marks_order_paid() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_mark_paid_if_pending().withf(|id| id.as_str() == "o1").times(1).returning(|_| Ok(true));
    db.expect_fetch_order_by_id()
        .times(1)
        .returning(|_| Ok(Some(order_with_items("o1", OrderStatusType::Paid, &[(1500, 1), (500, 1)]))));
    let req = signed_request(&completed_event(Some("o1")), Utc::now().timestamp());
    let (status, body) = send_request(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order o1 has been marked as paid"}"#);
}

#[actix_web::test]
async fn duplicate_delivery_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_mark_paid_if_pending().times(1).returning(|_| Ok(false));
    db.expect_fetch_order_by_id()
        .times(1)
        .returning(|_| Ok(Some(order_with_items("o1", OrderStatusType::Paid, &[(2000, 1)]))));
    let req = signed_request(&completed_event(Some("o1")), Utc::now().timestamp());
    let (status, body) = send_request(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order o1 was already paid"}"#);
}

#[actix_web::test]
async fn other_event_types_are_acknowledged_without_action() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "id": "evt_2", "object": "event", "type": "payment_intent.created",
        "data": { "object": { "id": "pi_1", "amount": 2000 } }
    })
    .to_string();
    let (status, body) = send_request(signed_request(&body, Utc::now().timestamp()), configure(untouched_db())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Event type payment_intent.created ignored"}"#);
}

#[actix_web::test]
async fn unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_mark_paid_if_pending().times(1).returning(|_| Ok(false));
    db.expect_fetch_order_by_id().times(1).returning(|_| Ok(None));
    let req = signed_request(&completed_event(Some("ghost")), Utc::now().timestamp());
    let (status, _) = send_request(req, configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn missing_order_id_or_bad_json_is_a_bad_request() {
    let _ = env_logger::try_init().ok();
    let req = signed_request(&completed_event(None), Utc::now().timestamp());
    let (status, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = signed_request("{\"id\": \"evt_3\", \"type\":", Utc::now().timestamp());
    let (status, _) = send_request(req, configure(untouched_db())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn database_failure_asks_for_redelivery() {
    let _ = env_logger::try_init().ok();
    let mut db = MockStorefront::new();
    db.expect_mark_paid_if_pending()
        .times(1)
        .returning(|_| Err(OrderStoreError::DatabaseError("database is locked".into())));
    let req = signed_request(&completed_event(Some("o1")), Utc::now().timestamp());
    let (status, _) = send_request(req, configure(db)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
