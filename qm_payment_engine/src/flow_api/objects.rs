use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::db_types::{ConversionError, Order, OrderItem};

/// What to do when a cart slug does not resolve against the product catalog during order
/// placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProductPolicy {
    /// Skip the item, log it, and report it back to the caller. The order still proceeds with the
    /// remaining items. This matches the storefront's historical behaviour.
    #[default]
    Lenient,
    /// Abort the entire order before anything is written.
    Strict,
}

impl Display for MissingProductPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingProductPolicy::Lenient => write!(f, "lenient"),
            MissingProductPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for MissingProductPolicy {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            s => Err(ConversionError("missing product policy", s.to_string())),
        }
    }
}

/// The result of a successful order placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Cart slugs that did not resolve and were skipped under the lenient policy. Surfaced to the
    /// caller so operators can detect dropped items, not just grep logs for them.
    pub skipped_items: Vec<String>,
}

/// The effect a payment notification had on an order.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The order transitioned from `Pending` to `Completed`.
    Completed(Order),
    /// The order was already in a terminal state. Redelivered notifications and regression
    /// attempts land here; nothing was written.
    AlreadyFinal(Order),
    /// No order matches the provider reference.
    NotFound,
}
