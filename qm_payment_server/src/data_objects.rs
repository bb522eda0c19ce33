//! Request and response objects for the HTTP API. The wire format is camelCase JSON, matching what
//! the storefront frontend sends; the internal types stay snake_case.

use qm_common::Money;
use qm_payment_engine::db_types::{CartItem, NewCustomer, Order, OrderId, OrderItem, PaymentStatus};
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    /// Set when the buyer is logged in. Links the customer record to the auth identity.
    #[serde(default)]
    pub auth_user_id: Option<String>,
}

impl CheckoutRequest {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.items.is_empty() {
            return Err(ServerError::ValidationError("The cart is empty.".to_string()));
        }
        if self.customer_name.trim().is_empty() || self.customer_email.trim().is_empty() {
            return Err(ServerError::ValidationError("Customer name and email are required.".to_string()));
        }
        if self.items.iter().any(|i| i.price < 0) {
            return Err(ServerError::ValidationError("Item prices cannot be negative.".to_string()));
        }
        Ok(())
    }

    pub fn cart_items(&self) -> Vec<CartItem> {
        self.items
            .iter()
            .map(|i| CartItem { product_slug: i.product_id.clone(), name: i.name.clone(), price: Money::from(i.price) })
            .collect()
    }

    pub fn new_customer(&self) -> NewCustomer {
        NewCustomer {
            email: self.customer_email.trim().to_string(),
            name: self.customer_name.trim().to_string(),
            auth_user_id: self.auth_user_id.clone(),
        }
    }
}

/// One cart entry as the storefront sends it. `productId` is the catalog slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: String,
    pub name: String,
    /// Minor currency units.
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub order_id: OrderId,
    /// The hosted checkout URL. Absent for bank transfers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    /// Cart slugs that did not resolve and were dropped from the order.
    pub skipped_items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummaryResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Acknowledgement returned to the webhook sender. Always delivered with a 200 once a decision has
/// been made, whether or not the notification matched an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub matched: bool,
    pub message: String,
}

impl WebhookAck {
    pub fn matched<S: Into<String>>(message: S) -> Self {
        Self { matched: true, message: message.into() }
    }

    pub fn unmatched() -> Self {
        Self { matched: false, message: "Payment could not be matched to an order".to_string() }
    }

    pub fn ignored<S: Into<String>>(message: S) -> Self {
        Self { matched: false, message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self { success: true, message: message.into() }
    }
}
