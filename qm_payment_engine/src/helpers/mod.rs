mod fees;
mod order_id;

pub use fees::{split_price, FeeSplit, DEFAULT_COMMISSION_RATE};
pub use order_id::new_order_id;
