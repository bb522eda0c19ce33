use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use qm_payment_engine::{db_types::PaymentStatus, CheckoutApi, MissingProductPolicy};
use serde_json::json;

use crate::{
    endpoint_tests::{
        helpers::{catalog_product, customer, get, order_with_status, post_json},
        mocks::MockCheckoutDb,
    },
    routes::{BankTransferCheckoutRoute, OrderStatusRoute},
};

fn checkout_body() -> serde_json::Value {
    json!({
        "items": [{"productId": "ind-a", "name": "Alpha Momentum Indicator", "price": 5000}],
        "customerName": "Yuki Tanaka",
        "customerEmail": "yuki@example.com"
    })
}

fn add_checkout_api(cfg: &mut ServiceConfig, db: MockCheckoutDb) {
    cfg.app_data(web::Data::new(CheckoutApi::new(db, MissingProductPolicy::Lenient)))
        .service(BankTransferCheckoutRoute::<MockCheckoutDb>::new());
}

#[actix_web::test]
async fn empty_cart_is_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        // Validation fails before any database access; the mock would panic if touched.
        add_checkout_api(cfg, MockCheckoutDb::new());
    }
    let body = json!({"items": [], "customerName": "Yuki Tanaka", "customerEmail": "yuki@example.com"});
    let (status, body) = post_json("/checkout/bank-transfer", body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("cart is empty"), "unexpected body: {body}");
}

#[actix_web::test]
async fn missing_customer_details_are_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        add_checkout_api(cfg, MockCheckoutDb::new());
    }
    let body = json!({
        "items": [{"productId": "ind-a", "name": "Alpha Momentum Indicator", "price": 5000}],
        "customerName": "   ",
        "customerEmail": ""
    });
    let (status, body) = post_json("/checkout/bank-transfer", body, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Customer name and email"), "unexpected body: {body}");
}

#[actix_web::test]
async fn bank_transfer_checkout_places_a_pending_order() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_upsert_customer().returning(|_| Ok(customer()));
        db.expect_fetch_product_by_slug()
            .withf(|slug| slug == "ind-a")
            .returning(|_| Ok(Some(catalog_product(1, "ind-a", "Alpha Momentum Indicator", 5000))));
        db.expect_insert_order().returning(|order, items| {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].platform_fee.value(), 1000);
            assert_eq!(items[0].seller_amount.value(), 4000);
            let now = Utc::now();
            let full_order = qm_payment_engine::db_types::Order {
                order_id: order.order_id,
                price: order.price,
                customer_name: order.customer_name,
                customer_email: order.customer_email,
                customer_id: order.customer_id,
                payment_method: order.payment_method,
                payment_status: PaymentStatus::Pending,
                square_order_id: None,
                square_payment_id: None,
                created_at: now,
                updated_at: now,
            };
            Ok((full_order, Vec::new()))
        });
        add_checkout_api(cfg, db);
    }
    let (status, body) = post_json("/checkout/bank-transfer", checkout_body(), configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["success"], true);
    assert!(response["orderId"].as_str().unwrap().starts_with("QM-"), "unexpected order id: {body}");
    assert!(response.get("checkoutUrl").is_none(), "bank transfers have no checkout URL: {body}");
    assert_eq!(response["skippedItems"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn unresolvable_cart_items_are_skipped_and_reported() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_upsert_customer().returning(|_| Ok(customer()));
        db.expect_fetch_product_by_slug().returning(|slug| {
            if slug == "ind-a" {
                Ok(Some(catalog_product(1, "ind-a", "Alpha Momentum Indicator", 5000)))
            } else {
                Ok(None)
            }
        });
        db.expect_insert_order().returning(|order, items| {
            // Only the resolvable item becomes a line item, but the order keeps the nominal total.
            assert_eq!(items.len(), 1);
            assert_eq!(order.price.value(), 7000);
            let now = Utc::now();
            let full_order = qm_payment_engine::db_types::Order {
                order_id: order.order_id,
                price: order.price,
                customer_name: order.customer_name,
                customer_email: order.customer_email,
                customer_id: order.customer_id,
                payment_method: order.payment_method,
                payment_status: PaymentStatus::Pending,
                square_order_id: None,
                square_payment_id: None,
                created_at: now,
                updated_at: now,
            };
            Ok((full_order, Vec::new()))
        });
        add_checkout_api(cfg, db);
    }
    let body = json!({
        "items": [
            {"productId": "ind-a", "name": "Alpha Momentum Indicator", "price": 5000},
            {"productId": "ind-gone", "name": "Delisted Indicator", "price": 2000}
        ],
        "customerName": "Yuki Tanaka",
        "customerEmail": "yuki@example.com"
    });
    let (status, body) = post_json("/checkout/bank-transfer", body, configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["skippedItems"], json!(["ind-gone"]));
}

#[actix_web::test]
async fn order_status_reports_the_current_state() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order()
            .withf(|id| id.as_str() == "QM-1700000000000-ABC123")
            .returning(|_| Ok(Some(order_with_status("QM-1700000000000-ABC123", PaymentStatus::Completed))));
        cfg.app_data(web::Data::new(CheckoutApi::new(db, MissingProductPolicy::Lenient)))
            .service(OrderStatusRoute::<MockCheckoutDb>::new());
    }
    let (status, body) = get("/order/QM-1700000000000-ABC123/status", configure).await;
    assert_eq!(status, StatusCode::OK);
    let response: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["paymentStatus"], "completed");
}

#[actix_web::test]
async fn unknown_order_status_is_a_404() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut db = MockCheckoutDb::new();
        db.expect_fetch_order().returning(|_| Ok(None));
        cfg.app_data(web::Data::new(CheckoutApi::new(db, MissingProductPolicy::Lenient)))
            .service(OrderStatusRoute::<MockCheckoutDb>::new());
    }
    let (status, _) = get("/order/QM-404-NOPE00/status", configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
