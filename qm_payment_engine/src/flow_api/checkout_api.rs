use std::fmt::Debug;

use log::*;
use qm_common::Money;

use crate::{
    db_types::{CartItem, NewCustomer, NewOrder, NewOrderItem, Order, OrderId, OrderItem, PaymentMethod, PaymentStatus},
    flow_api::objects::{MissingProductPolicy, PlacedOrder},
    helpers::split_price,
    traits::{CheckoutDatabase, CheckoutError},
};

/// `CheckoutApi` turns validated carts into pending orders with their fee-split line items, and
/// handles the order-side bookkeeping of the initiation flow (provider reference attachment,
/// failure marking, admin settlement of bank transfers).
pub struct CheckoutApi<B> {
    db: B,
    policy: MissingProductPolicy,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.policy)
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B, policy: MissingProductPolicy) -> Self {
        Self { db, policy }
    }
}

impl<B> CheckoutApi<B>
where B: CheckoutDatabase
{
    /// Place a new order for the given cart.
    ///
    /// * The customer is upserted by email; an existing authenticated-user link is never
    ///   overwritten.
    /// * The order price is the sum of the *nominal* cart prices, independent of slug resolution.
    /// * Each cart slug is resolved against the catalog and gets a line item with the fee split
    ///   computed from the product's commission rate at the time of purchase. Unresolvable slugs
    ///   are handled according to the configured [`MissingProductPolicy`].
    /// * The order and its items are written in one transaction, in `Pending` state.
    ///
    /// No provider call happens here. On provider failure the caller marks the order as failed
    /// with [`Self::mark_order_failed`]; the pending row is deliberately kept (not rolled back) as
    /// an audit trail of attempted purchases.
    pub async fn place_order(
        &self,
        order_id: OrderId,
        customer: NewCustomer,
        payment_method: PaymentMethod,
        items: &[CartItem],
    ) -> Result<PlacedOrder, CheckoutError> {
        let customer = self.db.upsert_customer(customer).await?;
        let price: Money = items.iter().map(|i| i.price).sum();
        let mut new_items = Vec::with_capacity(items.len());
        let mut skipped_items = Vec::new();
        for item in items {
            match self.db.fetch_product_by_slug(&item.product_slug).await? {
                Some(product) => {
                    let split = split_price(item.price, product.commission_rate);
                    new_items.push(NewOrderItem {
                        order_id: order_id.clone(),
                        product_id: product.id,
                        product_slug: product.slug,
                        product_name: product.name,
                        price: item.price,
                        seller_id: product.seller_id,
                        platform_fee: split.platform_fee,
                        seller_amount: split.seller_amount,
                    });
                },
                None if self.policy == MissingProductPolicy::Strict => {
                    info!("🛒️ Order {order_id} aborted: cart slug '{}' does not resolve", item.product_slug);
                    return Err(CheckoutError::ProductNotFound(item.product_slug.clone()));
                },
                None => {
                    warn!(
                        "🛒️ Cart slug '{}' in order {order_id} does not resolve. Skipping the item; the order \
                         proceeds with the remaining items.",
                        item.product_slug
                    );
                    skipped_items.push(item.product_slug.clone());
                },
            }
        }
        let new_order = NewOrder {
            order_id,
            price,
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            customer_id: Some(customer.id),
            payment_method,
        };
        let (order, items) = self.db.insert_order(new_order, &new_items).await?;
        debug!("🛒️ Order {} placed. {} items, {} skipped.", order.order_id, items.len(), skipped_items.len());
        Ok(PlacedOrder { order, items, skipped_items })
    }

    /// Persist the provider-assigned order reference after a successful payment-link call, making
    /// the provider-side order discoverable by the webhook reconciler.
    pub async fn attach_provider_reference(
        &self,
        order_id: &OrderId,
        square_order_id: &str,
    ) -> Result<Order, CheckoutError> {
        let order = self.db.attach_square_order(order_id, square_order_id).await?;
        debug!("🛒️ Provider reference {square_order_id} attached to order {order_id}");
        Ok(order)
    }

    /// Mark the order as failed after a provider error. The caller surfaces the error; there is no
    /// automatic retry. A fresh attempt requires a new order id.
    pub async fn mark_order_failed(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        match self.db.transition_from_pending(order_id, PaymentStatus::Failed).await? {
            Some(order) => {
                info!("🛒️ Order {order_id} marked as Failed");
                Ok(order)
            },
            None => self.require_order(order_id).await,
        }
    }

    /// The polling contract of the checkout-completion view: the current payment status of an
    /// order.
    pub async fn order_status(&self, order_id: &OrderId) -> Result<Option<PaymentStatus>, CheckoutError> {
        Ok(self.db.fetch_order(order_id).await?.map(|o| o.payment_status))
    }

    /// An order together with its line items. Any display summary is derived from the items
    /// relation; the order row itself carries no product fields.
    pub async fn order_summary(&self, order_id: &OrderId) -> Result<Option<(Order, Vec<OrderItem>)>, CheckoutError> {
        let Some(order) = self.db.fetch_order(order_id).await? else {
            return Ok(None);
        };
        let items = self.db.fetch_order_items(order_id).await?;
        Ok(Some((order, items)))
    }

    /// Admin action for the bank-transfer path: confirm receipt of funds. Only valid while the
    /// order is still `Pending`.
    pub async fn confirm_bank_transfer(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        match self.db.transition_from_pending(order_id, PaymentStatus::Completed).await? {
            Some(order) => {
                info!("🛒️ Bank transfer for order {order_id} confirmed");
                Ok(order)
            },
            None => {
                let order = self.require_order(order_id).await?;
                Err(CheckoutError::OrderNotPending(order_id.clone(), order.payment_status))
            },
        }
    }

    /// Admin action: cancel a pending order (typically a bank transfer that never cleared).
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        match self.db.transition_from_pending(order_id, PaymentStatus::Cancelled).await? {
            Some(order) => {
                info!("🛒️ Order {order_id} cancelled");
                Ok(order)
            },
            None => {
                let order = self.require_order(order_id).await?;
                Err(CheckoutError::OrderNotPending(order_id.clone(), order.payment_status))
            },
        }
    }

    async fn require_order(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        self.db.fetch_order(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }
}
