use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use qm_common::Secret;
use qm_payment_engine::{db_types::PaymentStatus, CheckoutApi, MissingProductPolicy};

use crate::{
    config::ADMIN_KEY_HEADER,
    endpoint_tests::{
        helpers::{order_item, order_with_status, pending_order, send},
        mocks::MockCheckoutDb,
    },
    middleware::AdminKeyMiddlewareFactory,
    routes::{CancelOrderRoute, ConfirmOrderRoute, OrderSummaryRoute},
};

const ADMIN_KEY: &str = "test-admin-key";
const ORDER_ID: &str = "QM-1700000000000-ABC123";

fn admin_scope(cfg: &mut ServiceConfig, db: MockCheckoutDb, key: &str) {
    cfg.app_data(web::Data::new(CheckoutApi::new(db, MissingProductPolicy::Lenient))).service(
        web::scope("/admin")
            .wrap(AdminKeyMiddlewareFactory::new(ADMIN_KEY_HEADER, Secret::new(key.to_string())))
            .service(OrderSummaryRoute::<MockCheckoutDb>::new())
            .service(ConfirmOrderRoute::<MockCheckoutDb>::new())
            .service(CancelOrderRoute::<MockCheckoutDb>::new()),
    );
}

#[actix_web::test]
async fn admin_routes_require_the_key() {
    fn configure(cfg: &mut ServiceConfig) {
        admin_scope(cfg, MockCheckoutDb::new(), ADMIN_KEY);
    }
    let req = TestRequest::post().uri(&format!("/admin/order/{ORDER_ID}/confirm"));
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_routes_reject_a_wrong_key() {
    fn configure(cfg: &mut ServiceConfig) {
        admin_scope(cfg, MockCheckoutDb::new(), ADMIN_KEY);
    }
    let req = TestRequest::post()
        .uri(&format!("/admin/order/{ORDER_ID}/confirm"))
        .insert_header((ADMIN_KEY_HEADER, "not-the-key"));
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_routes_fail_closed_without_a_configured_key() {
    fn configure(cfg: &mut ServiceConfig) {
        admin_scope(cfg, MockCheckoutDb::new(), "");
    }
    let req = TestRequest::post()
        .uri(&format!("/admin/order/{ORDER_ID}/confirm"))
        .insert_header((ADMIN_KEY_HEADER, "anything"));
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn confirming_a_pending_bank_transfer_completes_it() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_transition_from_pending()
            .withf(|id, status| id.as_str() == ORDER_ID && *status == PaymentStatus::Completed)
            .returning(|_, _| Ok(Some(order_with_status(ORDER_ID, PaymentStatus::Completed))));
        admin_scope(cfg, db, ADMIN_KEY);
    }
    let req = TestRequest::post()
        .uri(&format!("/admin/order/{ORDER_ID}/confirm"))
        .insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Completed"), "unexpected body: {body}");
}

#[actix_web::test]
async fn confirming_a_settled_order_is_a_conflict() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_transition_from_pending().returning(|_, _| Ok(None));
        db.expect_fetch_order().returning(|_| Ok(Some(order_with_status(ORDER_ID, PaymentStatus::Completed))));
        admin_scope(cfg, db, ADMIN_KEY);
    }
    let req = TestRequest::post()
        .uri(&format!("/admin/order/{ORDER_ID}/confirm"))
        .insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("not pending"), "unexpected body: {body}");
}

#[actix_web::test]
async fn cancelling_a_pending_order_succeeds() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_transition_from_pending()
            .withf(|id, status| id.as_str() == ORDER_ID && *status == PaymentStatus::Cancelled)
            .returning(|_, _| Ok(Some(order_with_status(ORDER_ID, PaymentStatus::Cancelled))));
        admin_scope(cfg, db, ADMIN_KEY);
    }
    let req = TestRequest::post()
        .uri(&format!("/admin/order/{ORDER_ID}/cancel"))
        .insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Cancelled"), "unexpected body: {body}");
}

#[actix_web::test]
async fn order_summary_includes_the_line_items() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order().returning(|_| Ok(Some(pending_order(ORDER_ID))));
        db.expect_fetch_order_items().returning(|_| Ok(vec![order_item(ORDER_ID, "ind-a", 5000, 1000)]));
        admin_scope(cfg, db, ADMIN_KEY);
    }
    let req = TestRequest::get().uri(&format!("/admin/order/{ORDER_ID}")).insert_header((ADMIN_KEY_HEADER, ADMIN_KEY));
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["order"]["order_id"], ORDER_ID);
    assert_eq!(response["items"][0]["platform_fee"], 1000);
    assert_eq!(response["items"][0]["seller_amount"], 4000);
}
