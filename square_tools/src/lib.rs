//! A thin client for the subset of the Square HTTP API that the QuantMarket payment server uses:
//! hosted payment-link creation and order lookups, plus the webhook envelope types.
mod api;
mod config;
pub mod data_objects;
mod error;

pub use api::{OrderLookup, SquareApi};
pub use config::{SquareConfig, SquareEnvironment};
pub use data_objects::{PaymentLink, SquareOrder, SquarePayment, WebhookEvent};
pub use error::SquareApiError;
