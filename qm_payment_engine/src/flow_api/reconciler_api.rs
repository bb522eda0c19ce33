use std::fmt::Debug;

use log::*;

use crate::{
    db_types::OrderId,
    flow_api::objects::ReconcileOutcome,
    traits::{CheckoutDatabase, CheckoutError},
};

/// `ReconcilerApi` applies asynchronous, at-least-once, possibly out-of-order payment
/// notifications to order state — exactly once in effect.
///
/// All updates go through a `Pending`-guarded SQL transition, so redelivered notifications and
/// regression attempts are no-ops. No locking is involved; correctness rests entirely on that
/// guard.
pub struct ReconcilerApi<B> {
    db: B,
}

impl<B> Debug for ReconcilerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcilerApi")
    }
}

impl<B> ReconcilerApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ReconcilerApi<B>
where B: CheckoutDatabase
{
    /// Direct matching: look the order up by the provider-assigned reference stored during
    /// initiation, and complete it.
    ///
    /// Returns [`ReconcileOutcome::NotFound`] when no order carries the reference — either the
    /// initiation call has not finished persisting it yet (a genuine race; the caller may fall
    /// back to a provider lookup) or the notification belongs to an order that will never
    /// reconcile (test traffic).
    pub async fn complete_by_provider_reference(
        &self,
        square_order_id: &str,
        square_payment_id: &str,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        let Some(order) = self.db.fetch_order_by_square_order_id(square_order_id).await? else {
            debug!("🔄️ No order carries provider reference {square_order_id}");
            return Ok(ReconcileOutcome::NotFound);
        };
        self.complete(order.order_id.clone(), square_order_id, square_payment_id).await
    }

    /// Fallback matching: the provider's own order record gave us back the caller-supplied
    /// reference id, which equals the internal order id. Completes the order by that id and
    /// (re)persists the provider reference along the way.
    pub async fn complete_order(
        &self,
        order_id: &OrderId,
        square_order_id: &str,
        square_payment_id: &str,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        if self.db.fetch_order(order_id).await?.is_none() {
            debug!("🔄️ Order {order_id} (from provider reference {square_order_id}) not found");
            return Ok(ReconcileOutcome::NotFound);
        }
        self.complete(order_id.clone(), square_order_id, square_payment_id).await
    }

    async fn complete(
        &self,
        order_id: OrderId,
        square_order_id: &str,
        square_payment_id: &str,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        match self.db.complete_order(&order_id, square_order_id, square_payment_id).await? {
            Some(order) => {
                info!("🔄️ Order {order_id} completed by payment {square_payment_id}");
                Ok(ReconcileOutcome::Completed(order))
            },
            None => {
                // The guarded update did not apply: the order is already in a terminal state.
                let order = self
                    .db
                    .fetch_order(&order_id)
                    .await?
                    .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;
                debug!(
                    "🔄️ Order {order_id} is already {}. Notification {square_payment_id} has no effect.",
                    order.payment_status
                );
                Ok(ReconcileOutcome::AlreadyFinal(order))
            },
        }
    }
}
