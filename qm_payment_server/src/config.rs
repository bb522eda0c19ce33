//! Server configuration.
//!
//! Every knob is read from a `QMP_`-prefixed environment variable, with logged fallbacks for
//! anything optional. The only hard requirement is `QMP_DATABASE_URL`; everything else has a
//! development-friendly default, though you will want to set the Square credentials and the
//! webhook signing secret before taking real payments.

use log::*;
use qm_common::{parse_boolean_flag, Secret};
use qm_payment_engine::MissingProductPolicy;
use square_tools::{SquareConfig as SquareApiConfig, SquareEnvironment};

pub const DEFAULT_QMP_HOST: &str = "127.0.0.1";
pub const DEFAULT_QMP_PORT: u16 = 8380;
pub const DEFAULT_CURRENCY: &str = "JPY";
pub const DEFAULT_REDIRECT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:8380/webhook/square";

/// The header carrying the webhook payload signature.
pub const SQUARE_SIGNATURE_HEADER: &str = "x-square-hmacsha256-signature";
/// The header carrying the shared admin API key on `/admin` routes.
pub const ADMIN_KEY_HEADER: &str = "x-qmp-admin-key";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The server host address. Default: 127.0.0.1
    pub host: String,
    /// The server port. Default: 8380
    pub port: u16,
    /// The database URL. For SQLite this has the form `sqlite://<path>`.
    pub database_url: String,
    /// ISO currency code used for all order amounts. Default: JPY
    pub currency: String,
    /// Base URL of the storefront, used to build the post-payment redirect.
    pub redirect_base_url: String,
    /// Shared key protecting the `/admin` routes. When unset, admin routes refuse all requests.
    pub admin_api_key: Secret<String>,
    /// What to do when a cart references a product the catalog cannot resolve.
    pub missing_product_policy: MissingProductPolicy,
    pub square: SquareConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_QMP_HOST.to_string(),
            port: DEFAULT_QMP_PORT,
            database_url: String::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            redirect_base_url: DEFAULT_REDIRECT_BASE_URL.to_string(),
            admin_api_key: Secret::new(String::default()),
            missing_product_policy: MissingProductPolicy::default(),
            square: SquareConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = std::env::var("QMP_HOST").unwrap_or_else(|_| {
            info!("🪛️ QMP_HOST is not set. Using the default, {DEFAULT_QMP_HOST}.");
            DEFAULT_QMP_HOST.into()
        });
        let port = std::env::var("QMP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for QMP_PORT. {e} Using the default, {DEFAULT_QMP_PORT}.");
                    DEFAULT_QMP_PORT
                })
            })
            .unwrap_or(DEFAULT_QMP_PORT);
        let database_url = std::env::var("QMP_DATABASE_URL").unwrap_or_else(|_| {
            error!("🪛️ QMP_DATABASE_URL is not set. The server will not be able to open its database.");
            String::default()
        });
        let currency = std::env::var("QMP_CURRENCY").unwrap_or_else(|_| {
            info!("🪛️ QMP_CURRENCY is not set. Using the default, {DEFAULT_CURRENCY}.");
            DEFAULT_CURRENCY.into()
        });
        let redirect_base_url = std::env::var("QMP_REDIRECT_BASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ QMP_REDIRECT_BASE_URL is not set. Using {DEFAULT_REDIRECT_BASE_URL}. Buyers will be sent there after paying.");
            DEFAULT_REDIRECT_BASE_URL.into()
        });
        let admin_api_key = std::env::var("QMP_ADMIN_API_KEY").map(Secret::new).unwrap_or_else(|_| {
            warn!("🪛️ QMP_ADMIN_API_KEY is not set. Admin routes will refuse all requests.");
            Secret::new(String::default())
        });
        let missing_product_policy = std::env::var("QMP_MISSING_PRODUCT_POLICY")
            .map(|s| {
                s.parse::<MissingProductPolicy>().unwrap_or_else(|e| {
                    error!("🪛️ {e} Using the default, {}.", MissingProductPolicy::default());
                    MissingProductPolicy::default()
                })
            })
            .unwrap_or_default();
        let square = SquareConfig::from_env_or_default();
        Self { host, port, database_url, currency, redirect_base_url, admin_api_key, missing_product_policy, square }
    }
}

/// Square-facing configuration, covering both the REST client credentials and the webhook
/// verification settings.
#[derive(Debug, Clone)]
pub struct SquareConfig {
    pub environment: SquareEnvironment,
    pub api_version: String,
    pub access_token: Secret<String>,
    pub location_id: String,
    /// The signing secret Square issued for the webhook subscription.
    pub webhook_secret: Secret<String>,
    /// The notification URL as registered with Square. Signatures are computed over this exact
    /// string, so it must match the subscription even when the server sits behind a proxy that
    /// rewrites the request path.
    pub webhook_url: String,
    /// Whether to verify webhook signatures. Only ever disable this in local development.
    pub hmac_checks: bool,
}

impl Default for SquareConfig {
    fn default() -> Self {
        let api = SquareApiConfig::default();
        Self {
            environment: api.environment,
            api_version: api.api_version,
            access_token: api.access_token,
            location_id: api.location_id,
            webhook_secret: Secret::new(String::default()),
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            hmac_checks: true,
        }
    }
}

impl SquareConfig {
    pub fn from_env_or_default() -> Self {
        let api = SquareApiConfig::new_from_env_or_default();
        let webhook_secret = std::env::var("QMP_SQUARE_WEBHOOK_SECRET").map(Secret::new).unwrap_or_else(|_| {
            warn!("🪛️ QMP_SQUARE_WEBHOOK_SECRET is not set. Signed webhook requests cannot be verified.");
            Secret::new(String::default())
        });
        let webhook_url = std::env::var("QMP_SQUARE_WEBHOOK_URL").unwrap_or_else(|_| {
            warn!(
                "🪛️ QMP_SQUARE_WEBHOOK_URL is not set. Using {DEFAULT_WEBHOOK_URL}. This must match the notification \
                 URL registered with Square or every signature check will fail."
            );
            DEFAULT_WEBHOOK_URL.into()
        });
        let hmac_checks = parse_boolean_flag(std::env::var("QMP_SQUARE_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🪛️ Webhook signature checks are DISABLED. Do not run like this in production.");
        }
        Self {
            environment: api.environment,
            api_version: api.api_version,
            access_token: api.access_token,
            location_id: api.location_id,
            webhook_secret,
            webhook_url,
            hmac_checks,
        }
    }

    /// The subset of this configuration the REST client needs.
    pub fn api_config(&self) -> SquareApiConfig {
        SquareApiConfig {
            environment: self.environment,
            api_version: self.api_version.clone(),
            access_token: self.access_token.clone(),
            location_id: self.location_id.clone(),
        }
    }
}

/// The per-request slice of configuration the checkout handlers need.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub currency: String,
    pub redirect_base_url: String,
    pub location_id: String,
    pub environment: SquareEnvironment,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            currency: config.currency.clone(),
            redirect_base_url: config.redirect_base_url.clone(),
            location_id: config.square.location_id.clone(),
            environment: config.square.environment,
        }
    }
}
