use thiserror::Error;

use crate::db_types::{Customer, NewCustomer, NewOrder, NewOrderItem, Order, OrderId, OrderItem, PaymentStatus, Product};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} already exists")]
    OrderAlreadyExists(OrderId),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Product '{0}' could not be resolved")]
    ProductNotFound(String),
    #[error("Order {0} is not pending (current status: {1})")]
    OrderNotPending(OrderId, PaymentStatus),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutError::DatabaseError(e.to_string())
    }
}

/// This trait defines the behaviour of storage backends supporting the QuantMarket payment engine.
///
/// This behaviour includes:
/// * Customer upserts keyed by email.
/// * Catalog lookups used to resolve cart slugs into product snapshots.
/// * Atomic creation of orders with their fee-split line items.
/// * Guarded, idempotent order state transitions driven by provider notifications or admin action.
#[allow(async_fn_in_trait)]
pub trait CheckoutDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Upsert a customer by email.
    ///
    /// If a customer with this email exists, it is reused; the authenticated-user link is
    /// backfilled only when currently absent and never overwritten. Otherwise a new record is
    /// inserted. Returns the effective customer row.
    async fn upsert_customer(&self, customer: NewCustomer) -> Result<Customer, CheckoutError>;

    /// Resolve a product slug against the catalog. Returns `None` when the slug does not resolve
    /// (the caller decides whether that aborts the order or skips the item).
    async fn fetch_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CheckoutError>;

    /// Insert an order and its line items in a single transaction.
    ///
    /// The order is created in `Pending` state. Fails with [`CheckoutError::OrderAlreadyExists`]
    /// if the order id is already present; order ids are immutable once created.
    async fn insert_order(&self, order: NewOrder, items: &[NewOrderItem]) -> Result<(Order, Vec<OrderItem>), CheckoutError>;

    /// Fetch an order by its internal id.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError>;

    /// Fetch an order by the provider-assigned order reference stored during initiation.
    async fn fetch_order_by_square_order_id(&self, square_order_id: &str) -> Result<Option<Order>, CheckoutError>;

    /// Fetch the line items of an order, in insertion order.
    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, CheckoutError>;

    /// Persist the provider-assigned order reference on the order row so that webhook
    /// notifications can be matched to it later.
    async fn attach_square_order(&self, order_id: &OrderId, square_order_id: &str) -> Result<Order, CheckoutError>;

    /// Transition an order from `Pending` to the given status.
    ///
    /// The update is guarded: it only applies when the order is currently `Pending`, so terminal
    /// states never regress and redelivered notifications are no-ops. Returns `None` when the
    /// order exists but is not `Pending`, and [`CheckoutError::OrderNotFound`] when it does not
    /// exist at all.
    async fn transition_from_pending(&self, order_id: &OrderId, status: PaymentStatus) -> Result<Option<Order>, CheckoutError>;

    /// Mark an order as `Completed` and persist the provider payment identifier and order
    /// reference, guarded the same way as [`Self::transition_from_pending`]. Safe to call any
    /// number of times; only the first call has an effect.
    async fn complete_order(
        &self,
        order_id: &OrderId,
        square_order_id: &str,
        square_payment_id: &str,
    ) -> Result<Option<Order>, CheckoutError>;
}
