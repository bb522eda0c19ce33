//! QuantMarket Payment Engine
//!
//! The payment engine contains the core order and reconciliation logic for the QuantMarket
//! storefront. It is HTTP-framework agnostic; the server crate is a thin layer over the APIs
//! defined here.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should
//!    never need to access the database directly. Instead, use the public API provided by the
//!    engine. The exception is the data types used in the database, defined in [`mod@db_types`].
//! 2. The engine public API ([`mod@flow_api`]): [`CheckoutApi`] turns carts into pending orders
//!    with their fee-split line items, and [`ReconcilerApi`] applies provider payment notifications
//!    to order state, idempotently. Backends implement [`traits::CheckoutDatabase`] to drive them.
pub mod db_types;
mod flow_api;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

/// Utilities for setting up throwaway databases in integration tests.
#[cfg(feature = "sqlite")]
pub mod test_utils;

pub use flow_api::{CheckoutApi, MissingProductPolicy, PlacedOrder, ReconcileOutcome, ReconcilerApi};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
