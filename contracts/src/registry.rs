//! Asset registry contract.
//!
//! Append-only table of up to [`ASSET_LIMIT`] assets. Each entry carries an
//! optional price feed plus an optional collateral role and an optional
//! synthetic role. Registration happens through the exchange engine;
//! reserve and minted-supply counters may only be moved by the engine so
//! that the registry totals always mirror what the engine has actually
//! booked.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::errors::ExchangeError;
use crate::types::{AssetEntry, CollateralInfo, SyntheticInfo, ASSET_LIMIT};

/// Asset registry contract
#[odra::module]
pub struct AssetRegistry {
    /// Registry admin address
    admin: Var<Address>,
    /// Exchange engine address, set after deployment
    engine: Var<Option<Address>>,
    /// Registered entries by index
    entries: Mapping<u8, AssetEntry>,
    /// Next free index, equal to the number of registered assets
    head: Var<u8>,
    /// Feeds already bound to an entry
    used_feeds: Mapping<Address, bool>,
}

#[odra::module]
impl AssetRegistry {
    /// Initialize an empty registry
    pub fn init(&mut self, admin: Address) {
        self.admin.set(admin);
        self.engine.set(None);
        self.head.set(0);
    }

    /// Wire the exchange engine address (admin only, once)
    pub fn set_engine(&mut self, engine: Address) {
        self.require_admin();
        if self.engine.get().flatten().is_some() {
            self.env().revert(ExchangeError::InvalidConfig);
        }
        self.engine.set(Some(engine));
    }

    /// Append a collateral asset. Returns the new entry index.
    pub fn register_collateral_asset(
        &mut self,
        feed: Option<Address>,
        token_address: Address,
        collateral_ratio_permille: u32,
        max_reserve_limit: U256,
    ) -> u8 {
        self.require_admin_or_engine();
        let entry = AssetEntry {
            feed_address: feed,
            collateral: Some(CollateralInfo {
                token_address,
                reserve_balance: U256::zero(),
                collateral_ratio_permille,
                max_reserve_limit,
            }),
            synthetic: None,
        };
        self.append(entry)
    }

    /// Append a synthetic asset. Returns the new entry index.
    pub fn register_synthetic_asset(
        &mut self,
        feed: Option<Address>,
        token_address: Address,
        max_supply_limit: U256,
    ) -> u8 {
        self.require_admin_or_engine();
        let entry = AssetEntry {
            feed_address: feed,
            collateral: None,
            synthetic: Some(SyntheticInfo {
                token_address,
                minted_supply: U256::zero(),
                max_supply_limit,
            }),
        };
        self.append(entry)
    }

    /// Raise or lower the supply ceiling of a synthetic (admin or engine).
    ///
    /// A ceiling below the current minted supply is allowed; it only blocks
    /// further minting, it never forces a burn.
    pub fn set_max_supply(&mut self, index: u8, max_supply_limit: U256) {
        self.require_admin_or_engine();
        let mut entry = self.entry_or_revert(index);
        match entry.synthetic.as_mut() {
            Some(synthetic) => synthetic.max_supply_limit = max_supply_limit,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
        self.entries.set(&index, entry);
    }

    /// Book a deposit into a collateral reserve (engine only)
    pub fn increase_reserve(&mut self, index: u8, amount: U256) {
        self.require_engine();
        let mut entry = self.entry_or_revert(index);
        match entry.collateral.as_mut() {
            Some(collateral) => {
                let new_balance = collateral
                    .reserve_balance
                    .checked_add(amount)
                    .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
                if new_balance > collateral.max_reserve_limit {
                    self.env().revert(ExchangeError::ReserveLimitExceeded);
                }
                collateral.reserve_balance = new_balance;
            }
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
        self.entries.set(&index, entry);
    }

    /// Book a withdrawal out of a collateral reserve (engine only)
    pub fn decrease_reserve(&mut self, index: u8, amount: U256) {
        self.require_engine();
        let mut entry = self.entry_or_revert(index);
        match entry.collateral.as_mut() {
            Some(collateral) => {
                collateral.reserve_balance = collateral
                    .reserve_balance
                    .checked_sub(amount)
                    .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
            }
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
        self.entries.set(&index, entry);
    }

    /// Book newly minted synthetic supply (engine only)
    pub fn increase_minted(&mut self, index: u8, amount: U256) {
        self.require_engine();
        let mut entry = self.entry_or_revert(index);
        match entry.synthetic.as_mut() {
            Some(synthetic) => {
                let new_supply = synthetic
                    .minted_supply
                    .checked_add(amount)
                    .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
                if new_supply > synthetic.max_supply_limit {
                    self.env().revert(ExchangeError::MaxSupplyExceeded);
                }
                synthetic.minted_supply = new_supply;
            }
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
        self.entries.set(&index, entry);
    }

    /// Book burned synthetic supply (engine only)
    pub fn decrease_minted(&mut self, index: u8, amount: U256) {
        self.require_engine();
        let mut entry = self.entry_or_revert(index);
        match entry.synthetic.as_mut() {
            Some(synthetic) => {
                synthetic.minted_supply = synthetic
                    .minted_supply
                    .checked_sub(amount)
                    .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
            }
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
        self.entries.set(&index, entry);
    }

    /// Entry at `index`, or none past the head
    pub fn get_entry(&self, index: u8) -> Option<AssetEntry> {
        self.entries.get(&index)
    }

    /// Number of registered assets
    pub fn asset_count(&self) -> u8 {
        self.head.get().unwrap_or(0)
    }

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Get the engine address
    pub fn get_engine(&self) -> Option<Address> {
        self.engine.get().flatten()
    }

    /// Check if caller is admin
    pub fn is_admin(&self, caller: Address) -> bool {
        self.admin.get().map_or(false, |admin| admin == caller)
    }

    fn append(&mut self, entry: AssetEntry) -> u8 {
        let head = self.head.get().unwrap_or(0);
        if head >= ASSET_LIMIT {
            self.env().revert(ExchangeError::RegistryFull);
        }
        if let Some(feed) = entry.feed_address {
            if self.used_feeds.get(&feed).unwrap_or(false) {
                self.env().revert(ExchangeError::DuplicateFeed);
            }
            self.used_feeds.set(&feed, true);
        }
        self.entries.set(&head, entry);
        self.head.set(head + 1);
        head
    }

    fn entry_or_revert(&self, index: u8) -> AssetEntry {
        match self.entries.get(&index) {
            Some(entry) => entry,
            None => self.env().revert(ExchangeError::AssetNotRegistered),
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if !self.is_admin(caller) {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }

    fn require_engine(&self) {
        let caller = self.env().caller();
        if self.engine.get().flatten() != Some(caller) {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }

    fn require_admin_or_engine(&self) {
        let caller = self.env().caller();
        if self.is_admin(caller) || self.engine.get().flatten() == Some(caller) {
            return;
        }
        self.env().revert(ExchangeError::Unauthorized);
    }
}
