use rand::{thread_rng, Rng};

use crate::db_types::OrderId;

const ORDER_ID_PREFIX: &str = "QM";
const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a new internal order identifier: `QM-<unix-ms>-<6-char-base36-random>`.
///
/// This format is a stable wire contract: the id is the orders table primary key *and* the
/// idempotency key handed to the payment provider, so existing stores depend on it.
pub fn new_order_id() -> OrderId {
    let ts = chrono::Utc::now().timestamp_millis();
    let mut rng = thread_rng();
    let suffix: String =
        (0..SUFFIX_LEN).map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char).collect();
    OrderId(format!("{ORDER_ID_PREFIX}-{ts}-{suffix}"))
}
