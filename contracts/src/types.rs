//! Common types used across the synthetic exchange.

use odra::casper_types::U256;
use odra::prelude::*;

/// Maximum number of registered assets
pub const ASSET_LIMIT: u8 = 30;

/// Registry index of the protocol's native collateral asset
pub const NATIVE_ASSET_INDEX: u8 = 0;

/// Registry index of the USD-pegged synthetic (the debt-denominated asset)
pub const USD_ASSET_INDEX: u8 = 1;

/// Normalized price scale (1e18, USD per 1 token unit)
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Debt value per share scale (1e18)
pub const SHARE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Unit debt value per share (rate 1.0), in force whenever no shares exist
pub const UNIT_DEBT_VALUE: u128 = SHARE_SCALE;

/// Collateral ratio scale (permille, 1000 = 100%)
pub const RATIO_SCALE: u32 = 1000;

/// Swap fee scale (100_000, so 300 = 0.3%)
pub const FEE_SCALE: u32 = 100_000;

/// Price reported by the oracle for one feed
#[odra::odra_type]
pub struct PriceFeedData {
    /// Raw price value as published by the feed
    pub price: U256,
    /// Decimal exponent of `price` (price_usd = price * 10^exponent)
    pub exponent: i32,
    /// Block time at which the price was published
    pub publish_time: u64,
}

/// Collateral descriptor for a registered asset
#[odra::odra_type]
pub struct CollateralInfo {
    /// Token contract holding user balances of this collateral
    pub token_address: Address,
    /// Custodial holdings across all exchange accounts
    pub reserve_balance: U256,
    /// Discount applied to USD value before it counts toward mintable debt
    pub collateral_ratio_permille: u32,
    /// Cap on `reserve_balance`, enforced on deposit
    pub max_reserve_limit: U256,
}

/// Synthetic descriptor for a registered asset
#[odra::odra_type]
pub struct SyntheticInfo {
    /// Token contract the exchange mints and burns
    pub token_address: Address,
    /// Tokens currently issued against this asset
    pub minted_supply: U256,
    /// Cap on `minted_supply`
    pub max_supply_limit: U256,
}

/// One slot in the asset registry.
///
/// `feed_address == None` marks the USD-pegged synthetic: it is valued at a
/// fixed `PRICE_SCALE` and never goes stale.
#[odra::odra_type]
pub struct AssetEntry {
    /// Oracle feed this asset is valued against
    pub feed_address: Option<Address>,
    /// Collateral descriptor, if the asset can be deposited
    pub collateral: Option<CollateralInfo>,
    /// Synthetic descriptor, if the asset can be minted/swapped
    pub synthetic: Option<SyntheticInfo>,
}

/// Per-user ledger of collateral balances and debt shares.
///
/// `collaterals` is aligned 1:1 with registry order and sized to the
/// registry length at account creation; `registry_len` records that
/// snapshot so later registrations are detected on access.
#[odra::odra_type]
pub struct ExchangeAccount {
    /// Identity controlling the account
    pub owner: Address,
    /// Account schema version
    pub version: u8,
    /// Registry length at creation time
    pub registry_len: u8,
    /// This account's share of the global debt pool
    pub debt_shares: U256,
    /// Collateral amounts, indexed in registry order
    pub collaterals: Vec<U256>,
}

/// Engine configuration snapshot (admin-controlled fields)
#[odra::odra_type]
pub struct EngineConfig {
    /// Kill switch: all mutating operations fail while set
    pub halted: bool,
    /// Maximum accepted price age in block-time units
    pub max_price_delay: u64,
    /// Swap fee in `FEE_SCALE` units (300 = 0.3%)
    pub fee: u32,
    /// Account schema version accepted by the engine
    pub account_version: u8,
}
