//! The Square payment webhook handler.
//!
//! Square delivers payment events at least once, with no ordering guarantee, and retries on
//! anything other than a 2xx. The handler therefore:
//! * returns 200 once a *decision* has been reached, even when that decision is "ignore" or
//!   "unmatched", so Square stops retrying;
//! * returns 500 on backend failures, so Square *does* retry and the notification is not lost;
//! * never returns 4xx for payload-shape problems (an unparseable or irrelevant body is an
//!   acknowledged no-op, not an error).
//!
//! Signature verification happens before this handler runs, in
//! [`crate::middleware::HmacMiddlewareFactory`].
//!
//! Matching runs in two phases. The direct phase looks the order up by the provider order
//! reference persisted during checkout. If that misses (the webhook can arrive before the checkout
//! handler has persisted the reference), the fallback phase asks the provider for its order record
//! and recovers the internal order id from the reference we attached at creation time.

use actix_web::{web, HttpResponse};
use log::*;
use qm_payment_engine::{db_types::OrderId, traits::CheckoutDatabase, ReconcileOutcome, ReconcilerApi};
use square_tools::OrderLookup;

use crate::{data_objects::WebhookAck, errors::ServerError, route};

route!(square_webhook => Post "/square" impl CheckoutDatabase, OrderLookup);
pub async fn square_webhook<B: CheckoutDatabase, S: OrderLookup>(
    body: web::Bytes,
    api: web::Data<ReconcilerApi<B>>,
    lookup: web::Data<S>,
) -> Result<HttpResponse, ServerError> {
    let event: square_tools::WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("🧾️ Received a webhook event that could not be parsed. Acknowledging and ignoring. {e}");
            return Ok(HttpResponse::Ok().json(WebhookAck::ignored("Unparseable event")));
        },
    };
    trace!("🧾️ Received {} event {}", event.event_type, event.event_id.as_deref().unwrap_or("<no id>"));
    if event.event_type != "payment.completed" && event.event_type != "payment.updated" {
        debug!("🧾️ Ignoring {} event", event.event_type);
        return Ok(HttpResponse::Ok().json(WebhookAck::ignored("Irrelevant event type")));
    }
    let Some(payment) = event.payment() else {
        debug!("🧾️ {} event carries no payment object. Ignoring.", event.event_type);
        return Ok(HttpResponse::Ok().json(WebhookAck::ignored("No payment object")));
    };
    if payment.status != "COMPLETED" {
        debug!("🧾️ Payment {} has status {}. Nothing to do.", payment.id, payment.status);
        return Ok(HttpResponse::Ok().json(WebhookAck::ignored(format!("Payment status is {}", payment.status))));
    }
    let Some(square_order_id) = payment.order_id.as_deref() else {
        debug!("🧾️ Payment {} carries no order reference. Ignoring.", payment.id);
        return Ok(HttpResponse::Ok().json(WebhookAck::ignored("No order reference")));
    };

    let mut outcome = api.complete_by_provider_reference(square_order_id, &payment.id).await?;
    if matches!(outcome, ReconcileOutcome::NotFound) {
        debug!("🧾️ No order carries reference {square_order_id} yet. Falling back to a provider lookup.");
        outcome = match lookup.order_reference(square_order_id).await {
            Ok(Some(reference)) => {
                let order_id = OrderId::from(reference);
                api.complete_order(&order_id, square_order_id, &payment.id).await?
            },
            Ok(None) => ReconcileOutcome::NotFound,
            Err(e) => {
                // A transport failure is not a decision. Fail the request so the provider retries.
                error!("🧾️ Provider lookup for {square_order_id} failed. {e}");
                return Err(ServerError::BackendError(format!("Provider lookup failed. {e}")));
            },
        };
    }

    let ack = match outcome {
        ReconcileOutcome::Completed(order) => {
            info!("🧾️ Order {} completed by payment {}", order.order_id, payment.id);
            WebhookAck::matched(format!("Order {} completed", order.order_id))
        },
        ReconcileOutcome::AlreadyFinal(order) => {
            info!(
                "🧾️ Order {} is already {}. Payment {} acknowledged with no effect.",
                order.order_id, order.payment_status, payment.id
            );
            WebhookAck::matched(format!("Order {} already {}", order.order_id, order.payment_status))
        },
        ReconcileOutcome::NotFound => {
            info!("🧾️ Payment {} could not be matched to any order. Acknowledging anyway.", payment.id);
            WebhookAck::unmatched()
        },
    };
    Ok(HttpResponse::Ok().json(ack))
}
