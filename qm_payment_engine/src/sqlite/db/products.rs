use sqlx::SqliteConnection;

use crate::db_types::Product;

/// Resolves a product slug to the current catalog row, or `None` if the slug is unknown.
pub async fn fetch_product_by_slug(slug: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE slug = $1").bind(slug).fetch_optional(conn).await?;
    Ok(product)
}
