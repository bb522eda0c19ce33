use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use qm_common::Secret;
use qm_payment_engine::{db_types::PaymentStatus, traits::CheckoutError, ReconcilerApi};
use serde_json::json;

use crate::{
    config::SQUARE_SIGNATURE_HEADER,
    endpoint_tests::{
        helpers::{completed_order, order_with_status, pending_order, send},
        mocks::{MockCheckoutDb, MockOrderLookupClient},
    },
    helpers::calculate_webhook_signature,
    middleware::HmacMiddlewareFactory,
    webhook::SquareWebhookRoute,
};

const TEST_SECRET: &str = "whsec_test";
const TEST_URL: &str = "https://shop.example.com/webhook/square";
const ORDER_ID: &str = "QM-1700000000000-ABC123";
const SQUARE_ORDER_ID: &str = "sq-ord-1";
const PAYMENT_ID: &str = "pay-1";

fn webhook_scope(cfg: &mut ServiceConfig, db: MockCheckoutDb, lookup: MockOrderLookupClient) {
    cfg.app_data(web::Data::new(ReconcilerApi::new(db))).app_data(web::Data::new(lookup)).service(
        web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(
                SQUARE_SIGNATURE_HEADER,
                Secret::new(TEST_SECRET.to_string()),
                TEST_URL,
                true,
            ))
            .service(SquareWebhookRoute::<MockCheckoutDb, MockOrderLookupClient>::new()),
    );
}

fn payment_event(event_type: &str, order_id: Option<&str>, status: &str) -> serde_json::Value {
    json!({
        "type": event_type,
        "event_id": "evt-1",
        "data": {"object": {"payment": {"id": PAYMENT_ID, "order_id": order_id, "status": status}}}
    })
}

async fn post_signed(body: serde_json::Value, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let payload = body.to_string();
    let signature = calculate_webhook_signature(TEST_SECRET, TEST_URL, payload.as_bytes());
    let req = TestRequest::post()
        .uri("/webhook/square")
        .insert_header((SQUARE_SIGNATURE_HEADER, signature))
        .insert_header(("content-type", "application/json"))
        .set_payload(payload);
    send(req, configure).await
}

fn matched(body: &str) -> bool {
    let response: serde_json::Value = serde_json::from_str(body).unwrap();
    response["matched"].as_bool().unwrap()
}

#[actix_web::test]
async fn unsigned_requests_are_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        webhook_scope(cfg, MockCheckoutDb::new(), MockOrderLookupClient::new());
    }
    let payload = payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED").to_string();
    let req = TestRequest::post().uri("/webhook/square").set_payload(payload);
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn tampered_payloads_are_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        webhook_scope(cfg, MockCheckoutDb::new(), MockOrderLookupClient::new());
    }
    let signature = calculate_webhook_signature(TEST_SECRET, TEST_URL, b"the signed payload");
    let req = TestRequest::post()
        .uri("/webhook/square")
        .insert_header((SQUARE_SIGNATURE_HEADER, signature))
        .set_payload(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED").to_string());
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn wrong_method_is_rejected_with_405() {
    fn configure(cfg: &mut ServiceConfig) {
        webhook_scope(cfg, MockCheckoutDb::new(), MockOrderLookupClient::new());
    }
    let signature = calculate_webhook_signature(TEST_SECRET, TEST_URL, b"");
    let req = TestRequest::get().uri("/webhook/square").insert_header((SQUARE_SIGNATURE_HEADER, signature));
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn irrelevant_event_types_are_acknowledged_and_ignored() {
    fn configure(cfg: &mut ServiceConfig) {
        // No expectations: any database or provider call would panic.
        webhook_scope(cfg, MockCheckoutDb::new(), MockOrderLookupClient::new());
    }
    let (status, body) = post_signed(json!({"type": "order.created", "event_id": "evt-2"}), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!matched(&body));
}

#[actix_web::test]
async fn unparseable_payloads_are_acknowledged_and_ignored() {
    fn configure(cfg: &mut ServiceConfig) {
        webhook_scope(cfg, MockCheckoutDb::new(), MockOrderLookupClient::new());
    }
    let payload = "this is not json".to_string();
    let signature = calculate_webhook_signature(TEST_SECRET, TEST_URL, payload.as_bytes());
    let req = TestRequest::post()
        .uri("/webhook/square")
        .insert_header((SQUARE_SIGNATURE_HEADER, signature))
        .set_payload(payload);
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!matched(&body));
}

#[actix_web::test]
async fn non_completed_payments_are_ignored() {
    fn configure(cfg: &mut ServiceConfig) {
        webhook_scope(cfg, MockCheckoutDb::new(), MockOrderLookupClient::new());
    }
    let (status, body) = post_signed(payment_event("payment.updated", Some(SQUARE_ORDER_ID), "FAILED"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!matched(&body));
}

#[actix_web::test]
async fn completed_payment_matches_directly() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order_by_square_order_id()
            .withf(|id| id == SQUARE_ORDER_ID)
            .returning(|_| Ok(Some(pending_order(ORDER_ID))));
        db.expect_complete_order()
            .withf(|id, sq, pay| id.as_str() == ORDER_ID && sq == SQUARE_ORDER_ID && pay == PAYMENT_ID)
            .returning(|_, _, _| Ok(Some(completed_order(ORDER_ID, SQUARE_ORDER_ID, PAYMENT_ID))));
        webhook_scope(cfg, db, MockOrderLookupClient::new());
    }
    let (status, body) = post_signed(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(matched(&body), "unexpected body: {body}");
}

#[actix_web::test]
async fn early_webhook_falls_back_to_a_provider_lookup() {
    fn configure(cfg: &mut ServiceConfig) {
        // The provider reference has not been persisted yet, so the direct match misses.
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order_by_square_order_id().returning(|_| Ok(None));
        db.expect_fetch_order().withf(|id| id.as_str() == ORDER_ID).returning(|_| Ok(Some(pending_order(ORDER_ID))));
        db.expect_complete_order()
            .withf(|id, sq, pay| id.as_str() == ORDER_ID && sq == SQUARE_ORDER_ID && pay == PAYMENT_ID)
            .returning(|_, _, _| Ok(Some(completed_order(ORDER_ID, SQUARE_ORDER_ID, PAYMENT_ID))));
        let mut lookup = MockOrderLookupClient::new();
        lookup
            .expect_order_reference()
            .withf(|id| id == SQUARE_ORDER_ID)
            .returning(|_| Ok(Some(ORDER_ID.to_string())));
        webhook_scope(cfg, db, lookup);
    }
    let (status, body) = post_signed(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(matched(&body), "unexpected body: {body}");
}

#[actix_web::test]
async fn redelivered_webhooks_are_acknowledged_without_effect() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order_by_square_order_id()
            .returning(|_| Ok(Some(completed_order(ORDER_ID, SQUARE_ORDER_ID, PAYMENT_ID))));
        // The guarded update does not apply a second time.
        db.expect_complete_order().returning(|_, _, _| Ok(None));
        db.expect_fetch_order().returning(|_| Ok(Some(completed_order(ORDER_ID, SQUARE_ORDER_ID, PAYMENT_ID))));
        webhook_scope(cfg, db, MockOrderLookupClient::new());
    }
    let (status, body) = post_signed(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(matched(&body));
    assert!(body.contains("already"), "unexpected body: {body}");
}

#[actix_web::test]
async fn completed_payments_never_regress_terminal_orders() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order_by_square_order_id()
            .returning(|_| Ok(Some(order_with_status(ORDER_ID, PaymentStatus::Cancelled))));
        db.expect_complete_order().returning(|_, _, _| Ok(None));
        db.expect_fetch_order().returning(|_| Ok(Some(order_with_status(ORDER_ID, PaymentStatus::Cancelled))));
        webhook_scope(cfg, db, MockOrderLookupClient::new());
    }
    let (status, body) = post_signed(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cancelled"), "unexpected body: {body}");
}

#[actix_web::test]
async fn unmatched_payments_are_acknowledged() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order_by_square_order_id().returning(|_| Ok(None));
        let mut lookup = MockOrderLookupClient::new();
        lookup.expect_order_reference().returning(|_| Ok(None));
        webhook_scope(cfg, db, lookup);
    }
    let (status, body) = post_signed(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!matched(&body));
}

#[actix_web::test]
async fn backend_failures_surface_as_500_so_the_provider_retries() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order_by_square_order_id()
            .returning(|_| Err(CheckoutError::DatabaseError("database is locked".to_string())));
        webhook_scope(cfg, db, MockOrderLookupClient::new());
    }
    let (status, _) = post_signed(payment_event("payment.completed", Some(SQUARE_ORDER_ID), "COMPLETED"), configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
