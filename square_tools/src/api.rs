use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::SquareConfig,
    data_objects::{PaymentLink, PaymentLinkRequest, SquareOrder},
    SquareApiError,
};

/// Looking up a provider-side order to recover the caller-supplied reference id. The webhook
/// reconciler uses this as its fallback matching path; it is a trait so tests can mock it.
#[allow(async_fn_in_trait)]
pub trait OrderLookup {
    /// Returns the `reference_id` the caller attached when creating the order (the internal order
    /// id), or `None` if the provider does not know the order or carries no reference.
    async fn order_reference(&self, square_order_id: &str) -> Result<Option<String>, SquareApiError>;
}

#[derive(Clone)]
pub struct SquareApi {
    config: SquareConfig,
    client: Arc<Client>,
}

impl SquareApi {
    pub fn new(config: SquareConfig) -> Result<Self, SquareApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let bearer = format!("Bearer {}", config.access_token.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| SquareApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        let version =
            HeaderValue::from_str(&config.api_version).map_err(|e| SquareApiError::Initialization(e.to_string()))?;
        headers.insert("Square-Version", version);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SquareApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &SquareConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.environment.base_url())
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, SquareApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| SquareApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| SquareApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| SquareApiError::RestResponseError(e.to_string()))?;
            Err(SquareApiError::QueryError { status, message })
        }
    }

    /// Create a hosted checkout link for the given order.
    ///
    /// The request carries the internal order id as both idempotency key and order reference. On
    /// success the provider returns the checkout URL and its own order id, which the caller must
    /// persist for webhook matching.
    pub async fn create_payment_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, SquareApiError> {
        #[derive(Deserialize)]
        struct PaymentLinkResponse {
            payment_link: PaymentLink,
        }
        debug!("Creating payment link for order {}", request.order.reference_id);
        let result = self
            .rest_query::<PaymentLinkResponse, &PaymentLinkRequest>(
                Method::POST,
                "/v2/online-checkout/payment-links",
                Some(request),
            )
            .await?;
        info!("Payment link created for order {}", request.order.reference_id);
        Ok(result.payment_link)
    }

    /// Fetch a provider-side order by its Square order id.
    pub async fn get_order(&self, square_order_id: &str) -> Result<SquareOrder, SquareApiError> {
        #[derive(Deserialize)]
        struct OrderResponse {
            order: SquareOrder,
        }
        let path = format!("/v2/orders/{square_order_id}");
        debug!("Fetching order {square_order_id}");
        let result = self.rest_query::<OrderResponse, ()>(Method::GET, &path, None).await?;
        Ok(result.order)
    }
}

impl OrderLookup for SquareApi {
    async fn order_reference(&self, square_order_id: &str) -> Result<Option<String>, SquareApiError> {
        match self.get_order(square_order_id).await {
            Ok(order) => Ok(order.reference_id),
            Err(SquareApiError::QueryError { status: 404, .. }) => {
                debug!("Order {square_order_id} is unknown to the provider");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }
}
