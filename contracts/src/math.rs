//! Valuation and debt-pool math.
//!
//! Pure functions shared by the exchange engine:
//! - oracle price normalization onto the 1e18 USD scale
//! - collateral valuation and ratio discounting
//! - share <-> USD value conversion for the debt pool
//! - swap output and fee accrual into the share rate
//!
//! All divisions round down. Residual value from rounding stays with the
//! pool, so share issuance, share burning and swap output can never drain
//! more than the backing value.

use odra::casper_types::U256;

use crate::types::{FEE_SCALE, PRICE_SCALE, RATIO_SCALE, SHARE_SCALE};

/// Decimals of the normalized USD price scale
pub const PRICE_DECIMALS: i32 = 18;

/// Swap outcome: tokens out plus the fee retained by the pool
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SwapOutcome {
    /// Output tokens of the target synthetic
    pub amount_out: U256,
    /// Fee in whole USD units, to be accrued into the share rate
    pub fee_value_usd: U256,
}

/// Normalize a raw oracle price onto the 1e18 scale.
///
/// `price_usd = price * 10^exponent`, so the normalized value is
/// `price * 10^(18 + exponent)` (dividing when the offset is negative).
/// Returns `None` on overflow.
pub fn normalize_price(price: U256, exponent: i32) -> Option<U256> {
    let offset = PRICE_DECIMALS.checked_add(exponent)?;
    if offset >= 0 {
        let factor = U256::from(10u64).checked_pow(U256::from(offset as u64))?;
        price.checked_mul(factor)
    } else {
        let factor = U256::from(10u64).checked_pow(U256::from((-offset) as u64))?;
        price.checked_div(factor)
    }
}

/// USD value of `amount` token units at a normalized `price`.
pub fn collateral_value(amount: U256, price: U256) -> Option<U256> {
    amount
        .checked_mul(price)
        .and_then(|v| v.checked_div(U256::from(PRICE_SCALE)))
}

/// Apply the collateral ratio discount to a USD value.
pub fn discount_value(value: U256, ratio_permille: u32) -> Option<U256> {
    value
        .checked_mul(U256::from(ratio_permille))
        .and_then(|v| v.checked_div(U256::from(RATIO_SCALE)))
}

/// USD debt value represented by `shares` at the current rate.
pub fn shares_to_value(shares: U256, debt_value_per_share: U256) -> Option<U256> {
    shares
        .checked_mul(debt_value_per_share)
        .and_then(|v| v.checked_div(U256::from(SHARE_SCALE)))
}

/// Shares corresponding to a USD debt value, rounded down.
///
/// The caller keeps `debt_value_per_share` at the unit value whenever no
/// shares exist, so the first mint issues exactly `value` shares.
pub fn value_to_shares(value: U256, debt_value_per_share: U256) -> Option<U256> {
    value
        .checked_mul(U256::from(SHARE_SCALE))
        .and_then(|v| v.checked_div(debt_value_per_share))
}

/// Compute swap output and fee.
///
/// `usd = amount_in * price_in`; `fee = usd * fee / FEE_SCALE`;
/// `amount_out = (usd - fee) / price_for`. The intermediate values stay on
/// the raw `amount * price` scale so the fee is not floored away before
/// the final division.
pub fn swap_out_amount(
    amount_in: U256,
    price_in: U256,
    price_for: U256,
    fee: u32,
) -> Option<SwapOutcome> {
    if price_for.is_zero() {
        return None;
    }
    let usd_raw = amount_in.checked_mul(price_in)?;
    let fee_raw = usd_raw
        .checked_mul(U256::from(fee))
        .and_then(|v| v.checked_div(U256::from(FEE_SCALE)))?;
    let net_raw = usd_raw.checked_sub(fee_raw)?;

    Some(SwapOutcome {
        amount_out: net_raw.checked_div(price_for)?,
        fee_value_usd: fee_raw.checked_div(U256::from(PRICE_SCALE))?,
    })
}

/// Accrue a USD fee into the share rate (NAV model).
///
/// Every outstanding share's claim grows by `fee_value / total_shares`.
/// With no shares outstanding there is no holder to credit and the rate is
/// returned unchanged.
pub fn accrue_fee_to_rate(
    debt_value_per_share: U256,
    total_shares: U256,
    fee_value_usd: U256,
) -> Option<U256> {
    if total_shares.is_zero() || fee_value_usd.is_zero() {
        return Some(debt_value_per_share);
    }
    let increment = fee_value_usd
        .checked_mul(U256::from(SHARE_SCALE))
        .and_then(|v| v.checked_div(total_shares))?;
    debt_value_per_share.checked_add(increment)
}
