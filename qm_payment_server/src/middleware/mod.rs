mod admin_key;
mod hmac;

pub use admin_key::AdminKeyMiddlewareFactory;
pub use hmac::HmacMiddlewareFactory;
