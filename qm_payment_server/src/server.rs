use std::time::Duration;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use log::*;
use qm_payment_engine::{CheckoutApi, ReconcilerApi, SqliteDatabase};
use square_tools::SquareApi;

use crate::{
    config::{ServerConfig, ServerOptions, ADMIN_KEY_HEADER, SQUARE_SIGNATURE_HEADER},
    errors::ServerError,
    middleware::{AdminKeyMiddlewareFactory, HmacMiddlewareFactory},
    routes::{
        health,
        BankTransferCheckoutRoute,
        CancelOrderRoute,
        CardCheckoutRoute,
        ConfirmOrderRoute,
        OrderStatusRoute,
        OrderSummaryRoute,
    },
    webhook::SquareWebhookRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.database_url.is_empty() {
        return Err(ServerError::ConfigurationError("QMP_DATABASE_URL is not set.".to_string()));
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not open the database. {e}")))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    info!("🗄️ Database ready at {}", config.database_url);
    let srv = create_server_instance(config, db)?;
    srv.await?;
    Ok(())
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let square = SquareApi::new(config.square.api_config())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Square client. {e}")))?;
    let options = ServerOptions::from_config(&config);
    let policy = config.missing_product_policy;
    let webhook_secret = config.square.webhook_secret.clone();
    let webhook_url = config.square.webhook_url.clone();
    let hmac_checks = config.square.hmac_checks;
    let admin_key = config.admin_api_key.clone();
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), policy);
        let reconciler_api = ReconcilerApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconciler_api))
            .app_data(web::Data::new(square.clone()))
            .app_data(web::Data::new(options.clone()))
            .service(health)
            .service(CardCheckoutRoute::<SqliteDatabase>::new())
            .service(BankTransferCheckoutRoute::<SqliteDatabase>::new())
            .service(OrderStatusRoute::<SqliteDatabase>::new())
            .service(
                web::scope("/webhook")
                    .wrap(HmacMiddlewareFactory::new(
                        SQUARE_SIGNATURE_HEADER,
                        webhook_secret.clone(),
                        &webhook_url,
                        hmac_checks,
                    ))
                    .service(SquareWebhookRoute::<SqliteDatabase, SquareApi>::new()),
            )
            .service(
                web::scope("/admin")
                    .wrap(AdminKeyMiddlewareFactory::new(ADMIN_KEY_HEADER, admin_key.clone()))
                    .service(OrderSummaryRoute::<SqliteDatabase>::new())
                    .service(ConfirmOrderRoute::<SqliteDatabase>::new())
                    .service(CancelOrderRoute::<SqliteDatabase>::new()),
            )
    })
    .keep_alive(Duration::from_secs(600))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
