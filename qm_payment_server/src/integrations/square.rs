//! Translation between checkout requests and the Square payment-link API.

use qm_payment_engine::db_types::OrderId;
use square_tools::data_objects::{
    CheckoutOptions,
    NewSquareOrder,
    PaymentLinkRequest,
    PrePopulatedData,
    SquareLineItem,
    SquareMoney,
};

use crate::{config::ServerOptions, data_objects::CheckoutRequest};

/// Build a payment-link request for the given checkout.
///
/// The internal order id travels as both the idempotency key and the provider order reference.
/// Line items mirror the cart one-to-one, including entries that did not resolve against the
/// catalog; the buyer pays the nominal cart total either way.
pub fn build_payment_link_request(
    request: &CheckoutRequest,
    order_id: &OrderId,
    options: &ServerOptions,
) -> PaymentLinkRequest {
    let line_items = request
        .items
        .iter()
        .map(|item| SquareLineItem {
            name: item.name.clone(),
            quantity: "1".to_string(),
            base_price_money: SquareMoney { amount: item.price, currency: options.currency.clone() },
        })
        .collect();
    let redirect_url = format!(
        "{}/checkout/complete?orderId={}&method=card",
        options.redirect_base_url.trim_end_matches('/'),
        order_id.as_str()
    );
    // The sandbox rejects pre-populated buyer emails of certain shapes, so it is only sent against
    // production.
    let pre_populated_data = if options.environment.is_sandbox() {
        None
    } else {
        Some(PrePopulatedData { buyer_email: request.customer_email.clone() })
    };
    PaymentLinkRequest {
        idempotency_key: order_id.as_str().to_string(),
        order: NewSquareOrder {
            location_id: options.location_id.clone(),
            reference_id: order_id.as_str().to_string(),
            line_items,
        },
        checkout_options: Some(CheckoutOptions { redirect_url }),
        pre_populated_data,
    }
}
