//! `SqliteDatabase` is a concrete implementation of a QuantMarket payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`CheckoutDatabase`] trait
//! on top of the query modules in [`super::db`].
use std::fmt::Debug;

use sqlx::SqlitePool;

use super::db::{customers, new_pool, order_items, orders, products, run_migrations};
use crate::{
    db_types::{Customer, NewCustomer, NewOrder, NewOrderItem, Order, OrderId, OrderItem, PaymentStatus, Product},
    traits::{CheckoutDatabase, CheckoutError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool with the given maximum number of connections.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding embedded migrations.
    pub async fn migrate(&self) -> Result<(), CheckoutError> {
        run_migrations(&self.pool).await.map_err(|e| CheckoutError::DatabaseError(e.to_string()))
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn upsert_customer(&self, customer: NewCustomer) -> Result<Customer, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let customer = customers::upsert_customer(customer, &mut tx).await?;
        tx.commit().await?;
        Ok(customer)
    }

    async fn fetch_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_by_slug(slug, &mut conn).await?;
        Ok(product)
    }

    async fn insert_order(
        &self,
        order: NewOrder,
        items: &[NewOrderItem],
    ) -> Result<(Order, Vec<OrderItem>), CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            inserted.push(order_items::insert_order_item(item.clone(), &mut tx).await?);
        }
        tx.commit().await?;
        Ok((order, inserted))
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_square_order_id(&self, square_order_id: &str) -> Result<Option<Order>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_square_order_id(square_order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, CheckoutError> {
        let mut conn = self.pool.acquire().await?;
        let items = order_items::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn attach_square_order(&self, order_id: &OrderId, square_order_id: &str) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::attach_square_order(order_id, square_order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn transition_from_pending(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Option<Order>, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::transition_from_pending(order_id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn complete_order(
        &self,
        order_id: &OrderId,
        square_order_id: &str,
        square_payment_id: &str,
    ) -> Result<Option<Order>, CheckoutError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::complete_order(order_id, square_order_id, square_payment_id, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }
}
