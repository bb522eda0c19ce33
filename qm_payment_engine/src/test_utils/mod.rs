//! Helpers for integration tests: throwaway SQLite databases and a small seed catalog.
//!
//! Test databases are created in the OS temp directory with a random suffix, so parallel test
//! binaries never collide.
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

pub fn random_db_path() -> String {
    format!("sqlite://{}/qm_test_store_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

/// Creates a fresh database at a random path, runs the migrations and returns a handle to it.
pub async fn prepare_test_env() -> SqliteDatabase {
    let url = random_db_path();
    create_database(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Test database ready at {url}");
    db
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
}

/// Seeds one seller and two products:
/// * `ind-a` — price 5000, platform default commission rate
/// * `ind-b` — price 3000, 10% commission override
pub async fn seed_catalog(db: &SqliteDatabase) {
    let (seller_id,): (i64,) = sqlx::query_as("INSERT INTO sellers (name) VALUES ($1) RETURNING id")
        .bind("Quant Signals KK")
        .fetch_one(db.pool())
        .await
        .expect("Error seeding seller");
    sqlx::query("INSERT INTO products (slug, name, price, seller_id, commission_rate) VALUES ($1, $2, $3, $4, $5)")
        .bind("ind-a")
        .bind("Alpha Momentum Indicator")
        .bind(5000i64)
        .bind(seller_id)
        .bind(Option::<f64>::None)
        .execute(db.pool())
        .await
        .expect("Error seeding product ind-a");
    sqlx::query("INSERT INTO products (slug, name, price, seller_id, commission_rate) VALUES ($1, $2, $3, $4, $5)")
        .bind("ind-b")
        .bind("Beta Breakout Indicator")
        .bind(3000i64)
        .bind(seller_id)
        .bind(Some(0.1f64))
        .execute(db.pool())
        .await
        .expect("Error seeding product ind-b");
}
