//! Exchange engine contract.
//!
//! Main entry point for users: collateral accounts, synthetic minting
//! against pooled debt, and synthetic-to-synthetic swaps. Debt is tracked
//! as shares of a common pool whose per-share USD value starts at 1.0 and
//! grows as swap fees accrue, so every debtor's obligation scales with the
//! pool without per-account writes.
//!
//! The engine never holds balances itself beyond deposited collateral
//! tokens; registered totals live in the asset registry and token supply
//! lives in the synthetic token contracts, both moved only through
//! engine-gated entry points.

use odra::prelude::*;
use odra::casper_types::{runtime_args, U256};
use odra::CallDef;

use crate::errors::ExchangeError;
use crate::math;
use crate::types::{
    AssetEntry, EngineConfig, ExchangeAccount, PriceFeedData, FEE_SCALE, PRICE_SCALE,
    RATIO_SCALE, UNIT_DEBT_VALUE, USD_ASSET_INDEX,
};

/// Default fee, 0.3% of swapped value
const DEFAULT_FEE: u32 = 300;

/// Default maximum price age in milliseconds (10 minutes)
const DEFAULT_MAX_PRICE_DELAY_MS: u64 = 600_000;

/// Exchange engine contract
#[odra::module]
pub struct Exchange {
    /// Engine admin address
    admin: Var<Address>,
    /// Asset registry address
    registry: Var<Address>,
    /// Price oracle address
    oracle: Var<Address>,
    /// Engine configuration
    config: Var<EngineConfig>,
    /// Total debt shares outstanding
    debt_shares: Var<U256>,
    /// USD value of one debt share, scaled by 1e18
    debt_value_per_share: Var<U256>,
    /// Exchange accounts by owner
    accounts: Mapping<Address, ExchangeAccount>,
}

#[odra::module]
impl Exchange {
    /// Initialize the engine. Registry wiring and asset seeding happen
    /// afterwards, once the registry knows this engine's address.
    pub fn init(&mut self, admin: Address, registry: Address, oracle: Address) {
        self.admin.set(admin);
        self.registry.set(registry);
        self.oracle.set(oracle);
        self.config.set(EngineConfig {
            halted: false,
            max_price_delay: DEFAULT_MAX_PRICE_DELAY_MS,
            fee: DEFAULT_FEE,
            account_version: 0,
        });
        self.debt_shares.set(U256::zero());
        self.debt_value_per_share.set(U256::from(UNIT_DEBT_VALUE));
    }

    /// Seed the registry with the two reserved entries (admin only):
    /// index 0 is the native collateral, index 1 the USD synthetic.
    ///
    /// The USD synthetic carries no feed and is always valued at $1.
    /// Must be called on an empty registry, after the registry has been
    /// wired to this engine.
    pub fn seed_registry(
        &mut self,
        native_token: Address,
        native_feed: Address,
        native_collateral_ratio_permille: u32,
        native_max_reserve_limit: U256,
        usd_token: Address,
        usd_max_supply_limit: U256,
    ) {
        self.require_admin();
        self.require_not_halted();
        if native_collateral_ratio_permille > RATIO_SCALE {
            self.env().revert(ExchangeError::InvalidConfig);
        }
        let registry = self.registry_address();
        if self.registry_asset_count() != 0 {
            self.env().revert(ExchangeError::InvalidConfig);
        }

        let native_args = runtime_args! {
            "feed" => Some(native_feed),
            "token_address" => native_token,
            "collateral_ratio_permille" => native_collateral_ratio_permille,
            "max_reserve_limit" => native_max_reserve_limit,
        };
        let native_call = CallDef::new("register_collateral_asset", true, native_args);
        self.env().call_contract::<u8>(registry, native_call);

        let usd_args = runtime_args! {
            "feed" => Option::<Address>::None,
            "token_address" => usd_token,
            "max_supply_limit" => usd_max_supply_limit,
        };
        let usd_call = CallDef::new("register_synthetic_asset", true, usd_args);
        self.env().call_contract::<u8>(registry, usd_call);
    }

    // ========== Account Management ==========

    /// Create an exchange account for the caller
    pub fn create_exchange_account(&mut self) {
        let caller = self.env().caller();
        if self.accounts.get(&caller).is_some() {
            self.env().revert(ExchangeError::AccountAlreadyExists);
        }

        let config = self.engine_config();
        let count = self.registry_asset_count();
        self.accounts.set(
            &caller,
            ExchangeAccount {
                owner: caller,
                version: config.account_version,
                registry_len: count,
                debt_shares: U256::zero(),
                collaterals: (0..count).map(|_| U256::zero()).collect(),
            },
        );
    }

    /// Account data for an owner
    pub fn get_account(&self, owner: Address) -> Option<ExchangeAccount> {
        self.accounts.get(&owner)
    }

    // ========== Collateral Operations ==========

    /// Deposit collateral into the caller's account.
    ///
    /// Pulls `amount` of the entry's token from the caller, who must have
    /// approved this contract beforehand.
    pub fn deposit(&mut self, index: u8, amount: U256) {
        self.require_not_halted();
        self.require_positive(amount);
        let caller = self.env().caller();
        let mut account = self.account_or_revert(caller);
        self.require_account_covers(&account, index);

        let entry = self.registry_entry(index);
        let collateral = match entry.collateral {
            Some(collateral) => collateral,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        };
        let new_reserve = collateral
            .reserve_balance
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        if new_reserve > collateral.max_reserve_limit {
            self.env().revert(ExchangeError::ReserveLimitExceeded);
        }

        self.pull_tokens(collateral.token_address, caller, amount);
        self.registry_adjust("increase_reserve", index, amount);

        let held = account.collaterals[index as usize];
        account.collaterals[index as usize] = held
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.accounts.set(&caller, account);
    }

    /// Withdraw free collateral from the caller's account.
    ///
    /// The withdrawal is rejected if it would push the account's debt above
    /// its remaining mint limit.
    pub fn withdraw(&mut self, index: u8, amount: U256) {
        self.require_not_halted();
        self.require_positive(amount);
        let caller = self.env().caller();
        let mut account = self.account_or_revert(caller);
        self.require_account_covers(&account, index);

        let entry = self.registry_entry(index);
        let collateral = match entry.collateral {
            Some(collateral) => collateral,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        };

        let held = account.collaterals[index as usize];
        if held < amount {
            self.env().revert(ExchangeError::InsufficientCollateral);
        }
        account.collaterals[index as usize] = held - amount;

        // The account must stay solvent against its pooled debt.
        let debt_value = self.account_debt_value(&account);
        let max_debt = self.account_max_debt(&account);
        if debt_value > max_debt {
            self.env().revert(ExchangeError::InsufficientCollateral);
        }

        self.registry_adjust("decrease_reserve", index, amount);
        self.push_tokens(collateral.token_address, caller, amount);
        self.accounts.set(&caller, account);
    }

    // ========== Debt Operations ==========

    /// Mint USD synthetic against the caller's collateral, crediting `to`.
    pub fn mint(&mut self, amount: U256, to: Address) {
        self.require_not_halted();
        self.require_positive(amount);
        let caller = self.env().caller();
        let mut account = self.account_or_revert(caller);

        let rate = self.current_rate();
        let total_shares = self.debt_shares.get().unwrap_or(U256::zero());

        let debt_value = match math::shares_to_value(account.debt_shares, rate) {
            Some(value) => value,
            None => self.env().revert(ExchangeError::AccountingInvariant),
        };
        let max_debt = self.account_max_debt(&account);
        let new_debt = debt_value
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        if new_debt > max_debt {
            self.env().revert(ExchangeError::MintLimitExceeded);
        }

        let shares = match math::value_to_shares(amount, rate) {
            Some(shares) => shares,
            None => self.env().revert(ExchangeError::AccountingInvariant),
        };

        let entry = self.registry_entry(USD_ASSET_INDEX);
        let synthetic = match entry.synthetic {
            Some(synthetic) => synthetic,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        };
        let new_supply = synthetic
            .minted_supply
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        if new_supply > synthetic.max_supply_limit {
            self.env().revert(ExchangeError::MaxSupplyExceeded);
        }

        self.registry_adjust("increase_minted", USD_ASSET_INDEX, amount);
        self.mint_tokens(synthetic.token_address, to, amount);

        account.debt_shares = account
            .debt_shares
            .checked_add(shares)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        let new_total = total_shares
            .checked_add(shares)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.debt_shares.set(new_total);
        self.debt_value_per_share.set(rate);
        self.accounts.set(&caller, account);
    }

    /// Repay pooled debt by burning USD synthetic from the caller.
    ///
    /// Burns at most the caller's outstanding debt value; any excess in
    /// `amount` is ignored.
    pub fn burn(&mut self, amount: U256) {
        self.require_not_halted();
        self.require_positive(amount);
        let caller = self.env().caller();
        let mut account = self.account_or_revert(caller);

        let rate = self.current_rate();
        let debt_value = match math::shares_to_value(account.debt_shares, rate) {
            Some(value) => value,
            None => self.env().revert(ExchangeError::AccountingInvariant),
        };
        if debt_value.is_zero() {
            return;
        }

        let (burn_value, burn_shares) = if amount >= debt_value {
            // Full repayment clears the rounding remainder as well.
            (debt_value, account.debt_shares)
        } else {
            let shares = match math::value_to_shares(amount, rate) {
                Some(shares) => shares,
                None => self.env().revert(ExchangeError::AccountingInvariant),
            };
            (amount, shares.min(account.debt_shares))
        };

        let entry = self.registry_entry(USD_ASSET_INDEX);
        let synthetic = match entry.synthetic {
            Some(synthetic) => synthetic,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        };

        self.burn_tokens(synthetic.token_address, caller, burn_value);
        self.registry_adjust("decrease_minted", USD_ASSET_INDEX, burn_value);

        account.debt_shares -= burn_shares;
        let total = self.debt_shares.get().unwrap_or(U256::zero());
        let new_total = total
            .checked_sub(burn_shares)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.debt_shares.set(new_total);
        // With no debtors left the rate resets to the unit value.
        if new_total.is_zero() {
            self.debt_value_per_share.set(U256::from(UNIT_DEBT_VALUE));
        }
        self.accounts.set(&caller, account);
    }

    // ========== Swap ==========

    /// Swap one synthetic for another at oracle prices, minus the fee.
    ///
    /// Burns `amount` of the input synthetic from the caller and mints the
    /// output synthetic. The fee stays in the debt pool by raising the
    /// per-share value, so swap volume accrues to debtors.
    pub fn swap(&mut self, index_in: u8, index_for: u8, amount: U256) {
        self.require_not_halted();
        self.require_positive(amount);
        if index_in == index_for {
            self.env().revert(ExchangeError::SelfSwap);
        }
        let caller = self.env().caller();

        let entry_in = self.registry_entry(index_in);
        let entry_for = self.registry_entry(index_for);
        let synthetic_in = match entry_in.synthetic {
            Some(ref synthetic) => synthetic.clone(),
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        };
        let synthetic_for = match entry_for.synthetic {
            Some(ref synthetic) => synthetic.clone(),
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        };

        let price_in = self.entry_price(&entry_in);
        let price_for = self.entry_price(&entry_for);
        let config = self.engine_config();

        let outcome = match math::swap_out_amount(amount, price_in, price_for, config.fee) {
            Some(outcome) => outcome,
            None => self.env().revert(ExchangeError::AccountingInvariant),
        };
        if outcome.amount_out.is_zero() {
            self.env().revert(ExchangeError::InvalidAmount);
        }

        let new_supply = synthetic_for
            .minted_supply
            .checked_add(outcome.amount_out)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        if new_supply > synthetic_for.max_supply_limit {
            self.env().revert(ExchangeError::MaxSupplyExceeded);
        }

        self.burn_tokens(synthetic_in.token_address, caller, amount);
        self.registry_adjust("decrease_minted", index_in, amount);
        self.registry_adjust("increase_minted", index_for, outcome.amount_out);
        self.mint_tokens(synthetic_for.token_address, caller, outcome.amount_out);

        let total_shares = self.debt_shares.get().unwrap_or(U256::zero());
        let rate = self.current_rate();
        let new_rate =
            match math::accrue_fee_to_rate(rate, total_shares, outcome.fee_value_usd) {
                Some(rate) => rate,
                None => self.env().revert(ExchangeError::AccountingInvariant),
            };
        self.debt_value_per_share.set(new_rate);
    }

    // ========== Asset Registration ==========

    /// Register a collateral asset (admin only). Returns the entry index.
    pub fn register_collateral_asset(
        &mut self,
        feed: Address,
        token_address: Address,
        collateral_ratio_permille: u32,
        max_reserve_limit: U256,
    ) -> u8 {
        self.require_admin();
        self.require_not_halted();
        if collateral_ratio_permille > RATIO_SCALE {
            self.env().revert(ExchangeError::InvalidConfig);
        }
        let args = runtime_args! {
            "feed" => Some(feed),
            "token_address" => token_address,
            "collateral_ratio_permille" => collateral_ratio_permille,
            "max_reserve_limit" => max_reserve_limit,
        };
        let call_def = CallDef::new("register_collateral_asset", true, args);
        self.env().call_contract(self.registry_address(), call_def)
    }

    /// Register a synthetic asset (admin only). Returns the entry index.
    pub fn register_synthetic_asset(
        &mut self,
        feed: Address,
        token_address: Address,
        max_supply_limit: U256,
    ) -> u8 {
        self.require_admin();
        self.require_not_halted();
        let args = runtime_args! {
            "feed" => Some(feed),
            "token_address" => token_address,
            "max_supply_limit" => max_supply_limit,
        };
        let call_def = CallDef::new("register_synthetic_asset", true, args);
        self.env().call_contract(self.registry_address(), call_def)
    }

    /// Change a synthetic's supply ceiling (admin only)
    pub fn set_max_supply(&mut self, index: u8, max_supply_limit: U256) {
        self.require_admin();
        self.require_not_halted();
        let args = runtime_args! {
            "index" => index,
            "max_supply_limit" => max_supply_limit,
        };
        let call_def = CallDef::new("set_max_supply", true, args);
        self.env().call_contract::<()>(self.registry_address(), call_def);
    }

    // ========== Admin Functions ==========

    /// Halt or resume user operations (admin only)
    pub fn set_halted(&mut self, halted: bool) {
        self.require_admin();
        let mut config = self.engine_config();
        config.halted = halted;
        self.config.set(config);
    }

    /// Set the swap fee (admin only). Scaled by 1e5, 300 = 0.3%.
    pub fn set_fee(&mut self, fee: u32) {
        self.require_admin();
        self.require_not_halted();
        if fee > FEE_SCALE {
            self.env().revert(ExchangeError::InvalidConfig);
        }
        let mut config = self.engine_config();
        config.fee = fee;
        self.config.set(config);
    }

    /// Set the maximum accepted price age in milliseconds (admin only).
    /// Zero disables the staleness check.
    pub fn set_max_price_delay(&mut self, max_price_delay: u64) {
        self.require_admin();
        self.require_not_halted();
        let mut config = self.engine_config();
        config.max_price_delay = max_price_delay;
        self.config.set(config);
    }

    /// Transfer admin to a new address (admin only)
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.require_not_halted();
        self.admin.set(new_admin);
    }

    // ========== Views ==========

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Engine configuration
    pub fn get_config(&self) -> EngineConfig {
        self.engine_config()
    }

    /// Total debt shares outstanding
    pub fn total_debt_shares(&self) -> U256 {
        self.debt_shares.get().unwrap_or(U256::zero())
    }

    /// USD value of one debt share, scaled by 1e18
    pub fn get_debt_value_per_share(&self) -> U256 {
        self.current_rate()
    }

    /// Current USD debt of an account
    pub fn debt_value_of(&self, owner: Address) -> U256 {
        let account = self.account_or_revert(owner);
        self.account_debt_value(&account)
    }

    /// Maximum USD debt an account's collateral supports
    pub fn max_debt_of(&self, owner: Address) -> U256 {
        let account = self.account_or_revert(owner);
        self.account_max_debt(&account)
    }

    // ========== Internal: Valuation ==========

    fn account_debt_value(&self, account: &ExchangeAccount) -> U256 {
        match math::shares_to_value(account.debt_shares, self.current_rate()) {
            Some(value) => value,
            None => self.env().revert(ExchangeError::AccountingInvariant),
        }
    }

    /// Sum of discounted collateral values across the account
    fn account_max_debt(&self, account: &ExchangeAccount) -> U256 {
        let count = self.registry_asset_count();
        if account.collaterals.len() > count as usize {
            self.env().revert(ExchangeError::SizeMismatch);
        }
        let mut total = U256::zero();
        for (index, held) in account.collaterals.iter().enumerate() {
            if held.is_zero() {
                continue;
            }
            let entry = self.registry_entry(index as u8);
            let collateral = match entry.collateral {
                Some(ref collateral) => collateral.clone(),
                None => self.env().revert(ExchangeError::AssetNotRegistered),
            };
            let price = self.entry_price(&entry);
            let value = math::collateral_value(*held, price)
                .and_then(|value| {
                    math::discount_value(value, collateral.collateral_ratio_permille)
                })
                .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
            total = total
                .checked_add(value)
                .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        }
        total
    }

    /// Normalized USD price of an entry. Feedless entries are fixed at $1.
    fn entry_price(&self, entry: &AssetEntry) -> U256 {
        let feed = match entry.feed_address {
            Some(feed) => feed,
            None => return U256::from(PRICE_SCALE),
        };
        let oracle = match self.oracle.get() {
            Some(oracle) => oracle,
            None => self.env().revert(ExchangeError::InvalidConfig),
        };

        let args = runtime_args! { "feed" => feed };
        let call_def = CallDef::new("get_price", false, args);
        let data: Option<PriceFeedData> = self.env().call_contract(oracle, call_def);
        let data = match data {
            Some(data) => data,
            None => self.env().revert(ExchangeError::OracleUnavailable),
        };
        if data.price.is_zero() {
            self.env().revert(ExchangeError::OracleUnavailable);
        }

        let config = self.engine_config();
        if config.max_price_delay > 0 {
            let now = self.env().get_block_time();
            if now.saturating_sub(data.publish_time) > config.max_price_delay {
                self.env().revert(ExchangeError::StalePrice);
            }
        }

        match math::normalize_price(data.price, data.exponent) {
            Some(price) => price,
            None => self.env().revert(ExchangeError::OracleUnavailable),
        }
    }

    fn current_rate(&self) -> U256 {
        if self.debt_shares.get().unwrap_or(U256::zero()).is_zero() {
            return U256::from(UNIT_DEBT_VALUE);
        }
        self.debt_value_per_share
            .get()
            .unwrap_or(U256::from(UNIT_DEBT_VALUE))
    }

    // ========== Internal: Cross-Contract ==========

    fn registry_address(&self) -> Address {
        match self.registry.get() {
            Some(registry) => registry,
            None => self.env().revert(ExchangeError::InvalidConfig),
        }
    }

    fn registry_asset_count(&self) -> u8 {
        let call_def = CallDef::new("asset_count", false, runtime_args! {});
        self.env().call_contract(self.registry_address(), call_def)
    }

    fn registry_entry(&self, index: u8) -> AssetEntry {
        let args = runtime_args! { "index" => index };
        let call_def = CallDef::new("get_entry", false, args);
        let entry: Option<AssetEntry> = self.env().call_contract(self.registry_address(), call_def);
        match entry {
            Some(entry) => entry,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
    }

    fn registry_adjust(&self, entry_point: &str, index: u8, amount: U256) {
        let args = runtime_args! {
            "index" => index,
            "amount" => amount,
        };
        let call_def = CallDef::new(entry_point, true, args);
        self.env()
            .call_contract::<()>(self.registry_address(), call_def);
    }

    fn pull_tokens(&self, token: Address, from: Address, amount: U256) {
        let args = runtime_args! {
            "owner" => from,
            "recipient" => self.env().self_address(),
            "amount" => amount,
        };
        let call_def = CallDef::new("transfer_from", true, args);
        let success: bool = self.env().call_contract(token, call_def);
        if !success {
            self.env().revert(ExchangeError::TransferFailed);
        }
    }

    fn push_tokens(&self, token: Address, to: Address, amount: U256) {
        let args = runtime_args! {
            "recipient" => to,
            "amount" => amount,
        };
        let call_def = CallDef::new("transfer", true, args);
        let success: bool = self.env().call_contract(token, call_def);
        if !success {
            self.env().revert(ExchangeError::TransferFailed);
        }
    }

    fn mint_tokens(&self, token: Address, to: Address, amount: U256) {
        let args = runtime_args! {
            "to" => to,
            "amount" => amount,
        };
        let call_def = CallDef::new("mint", true, args);
        self.env().call_contract::<()>(token, call_def);
    }

    fn burn_tokens(&self, token: Address, from: Address, amount: U256) {
        let args = runtime_args! {
            "from" => from,
            "amount" => amount,
        };
        let call_def = CallDef::new("burn_from", true, args);
        self.env().call_contract::<()>(token, call_def);
    }

    // ========== Internal: Guards ==========

    fn account_or_revert(&self, owner: Address) -> ExchangeAccount {
        match self.accounts.get(&owner) {
            Some(account) => account,
            None => self.env().revert(ExchangeError::AccountNotFound),
        }
    }

    /// Accounts are sized to the registry length at creation time; an
    /// index past that snapshot belongs to an asset registered later and
    /// is rejected rather than silently aliased.
    fn require_account_covers(&self, account: &ExchangeAccount, index: u8) {
        if index as usize >= account.collaterals.len() {
            self.env().revert(ExchangeError::SizeMismatch);
        }
    }

    fn engine_config(&self) -> EngineConfig {
        match self.config.get() {
            Some(config) => config,
            None => self.env().revert(ExchangeError::InvalidConfig),
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }

    fn require_not_halted(&self) {
        if self.engine_config().halted {
            self.env().revert(ExchangeError::Halted);
        }
    }

    fn require_positive(&self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(ExchangeError::InvalidAmount);
        }
    }
}
