use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use qm_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value for {0}: {1}")]
pub struct ConversionError(pub &'static str, pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The internal order identifier. Opaque, caller-generated and globally unique. It is used both as
/// the primary key of the orders table and as the idempotency key sent to the payment provider, so
/// a retried initiation request cannot double-charge.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payments go through the provider's hosted checkout page and are reconciled by webhook.
    Card,
    /// Bank transfers skip the provider entirely and are settled manually by an administrator.
    BankTransfer,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::BankTransfer => write!(f, "BankTransfer"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Card" | "card" => Ok(Self::Card),
            "BankTransfer" | "bank_transfer" => Ok(Self::BankTransfer),
            s => Err(ConversionError("payment method", s.to_string())),
        }
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The order has been created; no (confirmed) payment has been received.
    Pending,
    /// Payment has been received in full.
    Completed,
    /// The provider rejected the checkout-link request. A fresh attempt needs a new order id.
    Failed,
    /// The order was cancelled by an administrator.
    Cancelled,
}

impl PaymentStatus {
    /// Terminal states never regress. A later provider notification must not un-complete an order.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" | "pending" => Ok(Self::Pending),
            "Completed" | "completed" => Ok(Self::Completed),
            "Failed" | "failed" => Ok(Self::Failed),
            "Cancelled" | "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError("payment status", s.to_string())),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    /// The aggregate price of the cart: the sum of the *nominal* item prices at checkout time.
    pub price: Money,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// The provider-assigned order reference, set once the payment-link call succeeds. Used for
    /// direct webhook matching.
    pub square_order_id: Option<String>,
    /// The provider payment identifier, set when the order completes.
    pub square_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub price: Money,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_id: Option<i64>,
    pub payment_method: PaymentMethod,
}

//--------------------------------------       CartItem      ---------------------------------------------------------
/// One entry of an incoming cart, as supplied by the storefront. The slug is resolved against the
/// product catalog during order placement.
#[derive(Debug, Clone)]
pub struct CartItem {
    pub product_slug: String,
    pub name: String,
    pub price: Money,
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
/// One product line within an order, carrying its own fee split. Snapshot data; never mutated
/// after creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: i64,
    pub product_slug: String,
    pub product_name: String,
    pub price: Money,
    pub seller_id: i64,
    pub platform_fee: Money,
    pub seller_amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: i64,
    pub product_slug: String,
    pub product_name: String,
    pub price: Money,
    pub seller_id: i64,
    pub platform_fee: Money,
    pub seller_amount: Money,
}

//--------------------------------------      Customer       ---------------------------------------------------------
/// Identity record keyed by email, optionally linked to an authenticated user identity.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub auth_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub name: String,
    pub auth_user_id: Option<String>,
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub price: Money,
    pub seller_id: i64,
    /// Per-product commission override. When absent, the platform default rate applies.
    pub commission_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
}
