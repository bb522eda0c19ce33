//! The engine's public API surface: order placement and webhook reconciliation flows, generic over
//! the storage backend.
mod checkout_api;
mod objects;
mod reconciler_api;

pub use checkout_api::CheckoutApi;
pub use objects::{MissingProductPolicy, PlacedOrder, ReconcileOutcome};
pub use reconciler_api::ReconcilerApi;
