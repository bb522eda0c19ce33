use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Customer, NewCustomer};

/// Upserts a customer by email.
///
/// At most one customer exists per email. If the email is already present, the existing row is
/// reused and the authenticated-user link is backfilled only when currently NULL; an existing link
/// is never overwritten.
pub async fn upsert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, sqlx::Error> {
    let result: Customer = sqlx::query_as(
        r#"
            INSERT INTO customers (email, name, auth_user_id) VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET
                auth_user_id = COALESCE(customers.auth_user_id, excluded.auth_user_id),
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(customer.email)
    .bind(customer.name)
    .bind(customer.auth_user_id)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Customer {} upserted with id {}", result.email, result.id);
    Ok(result)
}
