use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, PaymentStatus},
    traits::CheckoutError,
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can
/// embed this call inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as
/// the connection argument.
///
/// Orders are always created in `Pending` state. Fails if the order id already exists; order ids
/// are immutable once created.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, CheckoutError> {
    if fetch_order_by_order_id(&order.order_id, conn).await?.is_some() {
        return Err(CheckoutError::OrderAlreadyExists(order.order_id));
    }
    let inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                price,
                customer_name,
                customer_email,
                customer_id,
                payment_method,
                payment_status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.price.value())
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.customer_id)
    .bind(order.payment_method.to_string())
    .bind(PaymentStatus::Pending.to_string())
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted in Pending state", inserted.order_id);
    Ok(inserted)
}

/// Returns the orders table entry for the corresponding internal `order_id`.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns the orders table entry carrying the given provider-assigned order reference.
pub async fn fetch_order_by_square_order_id(
    square_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE square_order_id = $1")
        .bind(square_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Persists the provider-assigned order reference on the order row.
pub async fn attach_square_order(
    order_id: &OrderId,
    square_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, CheckoutError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET square_order_id = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(square_order_id)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    result.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
}

/// Transitions the order from `Pending` to the given status. The `WHERE payment_status =
/// 'Pending'` guard makes the update idempotent and prevents terminal states from regressing.
/// Returns `None` when the order was not in `Pending` state.
pub async fn transition_from_pending(
    order_id: &OrderId,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND \
         payment_status = 'Pending' RETURNING *",
    )
    .bind(status.to_string())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Marks the order as `Completed` and records the provider payment identifier and order
/// reference. Guarded on `Pending`, so redelivered notifications have no observable effect.
pub async fn complete_order(
    order_id: &OrderId,
    square_order_id: &str,
    square_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = 'Completed', square_order_id = $1, square_payment_id = $2, updated_at = \
         CURRENT_TIMESTAMP WHERE order_id = $3 AND payment_status = 'Pending' RETURNING *",
    )
    .bind(square_order_id)
    .bind(square_payment_id)
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(result)
}
