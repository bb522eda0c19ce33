//! # QuantMarket payment server
//! This crate hosts the HTTP layer of the QuantMarket payment gateway. It is responsible for:
//! * Turning storefront checkout requests into pending orders and hosted checkout links.
//! * Listening for incoming payment webhook notifications from Square and reconciling them
//!   against order state.
//! * Serving the order-status polling endpoint the checkout-completion view uses.
//! * Admin settlement of bank-transfer orders.
//!
//! ## Configuration
//! The server is configured via `QMP_`-prefixed environment variables. See [config](config/index.html).
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod endpoint_tests;
