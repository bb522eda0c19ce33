use qm_common::Money;

/// The commission rate applied when a product carries no explicit override.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.20;

/// The platform/seller split for a single order item. `platform_fee + seller_amount == price`
/// always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub platform_fee: Money,
    pub seller_amount: Money,
}

/// Split an item price into the platform fee and the seller payout, using the product's commission
/// rate at the time of purchase (or [`DEFAULT_COMMISSION_RATE`] if none is set).
///
/// The fee is `round(price * rate)` with half rounding away from zero, in integer minor currency
/// units. The seller amount is whatever remains.
pub fn split_price(price: Money, commission_rate: Option<f64>) -> FeeSplit {
    let rate = commission_rate.unwrap_or(DEFAULT_COMMISSION_RATE);
    #[allow(clippy::cast_possible_truncation)]
    let fee = (price.value() as f64 * rate).round() as i64;
    FeeSplit { platform_fee: Money::from(fee), seller_amount: price - Money::from(fee) }
}
