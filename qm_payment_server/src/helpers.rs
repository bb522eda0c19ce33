use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculate the webhook payload signature the way Square does: base64 of an HMAC-SHA256 over the
/// notification URL concatenated with the raw request body.
pub fn calculate_webhook_signature(secret: &str, notification_url: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(notification_url.as_bytes());
    mac.update(body);
    base64::encode(mac.finalize().into_bytes())
}

/// Verify a received signature in constant time. Returns false for signatures that are not valid
/// base64 as well as for signatures that do not match.
pub fn verify_webhook_signature(secret: &str, notification_url: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = base64::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(notification_url.as_bytes());
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}
