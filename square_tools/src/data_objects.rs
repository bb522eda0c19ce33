use serde::{Deserialize, Serialize};

//--------------------------------------  Payment link request  ------------------------------------------------------
/// Request body for `POST /v2/online-checkout/payment-links`.
///
/// The `idempotency_key` carries the internal order id, so a retried request after a network
/// failure cannot create a duplicate charge.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLinkRequest {
    pub idempotency_key: String,
    pub order: NewSquareOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_options: Option<CheckoutOptions>,
    /// Pre-populated buyer data. Must be omitted against the sandbox environment, which rejects
    /// certain email shapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_populated_data: Option<PrePopulatedData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSquareOrder {
    pub location_id: String,
    /// The caller-supplied reference: the internal order id. Round-trips through the provider and
    /// drives the webhook fallback matching.
    pub reference_id: String,
    pub line_items: Vec<SquareLineItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SquareLineItem {
    pub name: String,
    /// Always "1" for digital products; Square wants a string here.
    pub quantity: String,
    pub base_price_money: SquareMoney,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquareMoney {
    /// Integer minor currency units.
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOptions {
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrePopulatedData {
    pub buyer_email: String,
}

//--------------------------------------  Payment link response  -----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLink {
    pub id: Option<String>,
    /// The hosted checkout URL the buyer is redirected to.
    pub url: String,
    /// The provider-assigned order identifier, persisted for webhook matching.
    pub order_id: String,
}

//--------------------------------------      Square order      ------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct SquareOrder {
    pub id: String,
    pub reference_id: Option<String>,
    pub state: Option<String>,
}

//--------------------------------------   Webhook envelope     ------------------------------------------------------
/// The event envelope Square POSTs to the webhook endpoint:
/// `{type, event_id, data: {object: {payment: {id, order_id, status}}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub event_id: Option<String>,
    pub data: Option<WebhookData>,
}

impl WebhookEvent {
    /// The embedded payment object, if this event carries one.
    pub fn payment(&self) -> Option<&SquarePayment> {
        self.data.as_ref().and_then(|d| d.object.payment.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub object: WebhookObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub payment: Option<SquarePayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SquarePayment {
    pub id: String,
    pub order_id: Option<String>,
    /// Provider-side status string, e.g. "COMPLETED" or "FAILED".
    pub status: String,
}
