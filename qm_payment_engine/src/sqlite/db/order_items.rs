use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrderItem, OrderId, OrderItem};

/// Inserts a single order item. Not atomic on its own; embed in a transaction together with the
/// parent order insert.
pub async fn insert_order_item(item: NewOrderItem, conn: &mut SqliteConnection) -> Result<OrderItem, sqlx::Error> {
    let inserted: OrderItem = sqlx::query_as(
        r#"
            INSERT INTO order_items (
                order_id,
                product_id,
                product_slug,
                product_name,
                price,
                seller_id,
                platform_fee,
                seller_amount
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.product_slug)
    .bind(item.product_name)
    .bind(item.price.value())
    .bind(item.seller_id)
    .bind(item.platform_fee.value())
    .bind(item.seller_amount.value())
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order item [{}/{}] inserted", inserted.order_id, inserted.product_slug);
    Ok(inserted)
}

/// Fetches all line items of an order, in insertion order.
pub async fn fetch_order_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}
