//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are async; anything that touches the database or the payment provider awaits, so worker
//! threads keep serving other requests in the meantime.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use qm_payment_engine::{db_types::{OrderId, PaymentMethod}, traits::CheckoutDatabase, CheckoutApi};
use square_tools::SquareApi;

use crate::{
    config::ServerOptions,
    data_objects::{CheckoutRequest, CheckoutResponse, JsonResponse, OrderStatusResponse, OrderSummaryResponse},
    errors::ServerError,
    integrations::build_payment_link_request,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// Routes register a method-specific handler (rather than a guard) so that a request hitting the
// path with the wrong verb gets a 405 instead of a 404.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .route(actix_web::web::[<$method:lower>]().to($name));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .route(actix_web::web::[<$method:lower>]().to($name::< $( [< T $bounds:camel >], )+>));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

//----------------------------------------------   Health  ----------------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------  Checkout ----------------------------------------------------------
route!(card_checkout => Post "/checkout/card" impl CheckoutDatabase);
/// Card checkout: place a pending order and return a hosted checkout link.
///
/// The order and its fee-split line items are written first, so that a provider failure still
/// leaves an audit trail. Only then is the payment link requested; on provider failure the order
/// is marked `Failed` and the caller gets a 502.
pub async fn card_checkout<B: CheckoutDatabase>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
    square: web::Data<SquareApi>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    request.validate()?;
    let order_id = qm_payment_engine::helpers::new_order_id();
    debug!("💳️ Card checkout request received. Assigned order id {order_id}");
    let placed =
        api.place_order(order_id.clone(), request.new_customer(), PaymentMethod::Card, &request.cart_items()).await?;
    let link_request = build_payment_link_request(&request, &order_id, &options);
    match square.create_payment_link(&link_request).await {
        Ok(link) => {
            api.attach_provider_reference(&order_id, &link.order_id).await?;
            info!("💳️ Checkout link created for order {order_id}");
            Ok(HttpResponse::Ok().json(CheckoutResponse {
                success: true,
                order_id,
                checkout_url: Some(link.url),
                skipped_items: placed.skipped_items,
            }))
        },
        Err(e) => {
            error!("💳️ Could not create a checkout link for order {order_id}. {e}");
            if let Err(e) = api.mark_order_failed(&order_id).await {
                error!("💳️ Additionally, order {order_id} could not be marked as failed. {e}");
            }
            Err(ServerError::PaymentProviderError(e.to_string()))
        },
    }
}

route!(bank_transfer_checkout => Post "/checkout/bank-transfer" impl CheckoutDatabase);
/// Bank-transfer checkout: place a pending order and return transfer instructions. No provider is
/// involved; an administrator settles the order once the funds arrive.
pub async fn bank_transfer_checkout<B: CheckoutDatabase>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    request.validate()?;
    let order_id = qm_payment_engine::helpers::new_order_id();
    debug!("🏦️ Bank transfer checkout request received. Assigned order id {order_id}");
    let placed = api
        .place_order(order_id.clone(), request.new_customer(), PaymentMethod::BankTransfer, &request.cart_items())
        .await?;
    info!("🏦️ Order {order_id} placed, awaiting bank transfer");
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        success: true,
        order_id,
        checkout_url: None,
        skipped_items: placed.skipped_items,
    }))
}

//---------------------------------------------- Order status --------------------------------------------------------
route!(order_status => Get "/order/{order_id}/status" impl CheckoutDatabase);
/// The polling endpoint the checkout-completion view calls while it waits for the webhook to land.
pub async fn order_status<B: CheckoutDatabase>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    match api.order_status(&order_id).await? {
        Some(payment_status) => Ok(HttpResponse::Ok().json(OrderStatusResponse { order_id, payment_status })),
        None => Err(ServerError::NoRecordFound(format!("Order {order_id} not found"))),
    }
}

//----------------------------------------------    Admin   ----------------------------------------------------------
route!(order_summary => Get "/order/{order_id}" impl CheckoutDatabase);
/// An order with its line items, for back-office use. The summary is derived entirely from the
/// items relation.
pub async fn order_summary<B: CheckoutDatabase>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    match api.order_summary(&order_id).await? {
        Some((order, items)) => Ok(HttpResponse::Ok().json(OrderSummaryResponse { order, items })),
        None => Err(ServerError::NoRecordFound(format!("Order {order_id} not found"))),
    }
}

route!(confirm_order => Post "/order/{order_id}/confirm" impl CheckoutDatabase);
/// Admin settlement of a bank transfer. Returns 409 when the order is no longer pending.
pub async fn confirm_order<B: CheckoutDatabase>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let order = api.confirm_bank_transfer(&order_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {} is now {}", order.order_id, order.payment_status))))
}

route!(cancel_order => Post "/order/{order_id}/cancel" impl CheckoutDatabase);
/// Admin cancellation of a pending order. Returns 409 when the order is no longer pending.
pub async fn cancel_order<B: CheckoutDatabase>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    let order = api.cancel_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order {} is now {}", order.order_id, order.payment_status))))
}
