//! Synthetic token contract.
//!
//! CEP-18 style fungible token with engine-controlled minting and burning.
//! One instance is deployed per synthetic asset; the exchange engine is
//! added as an authorized minter and is the only party that may create or
//! destroy supply. Admin gating is delegated to the asset registry so all
//! tokens share a single admin source of truth.

use odra::prelude::*;
use odra::casper_types::{runtime_args, U256};
use odra::CallDef;

use crate::errors::ExchangeError;

/// Synthetic token contract
#[odra::module]
pub struct SynthToken {
    /// Token name
    name: Var<String>,
    /// Token symbol
    symbol: Var<String>,
    /// Decimals
    decimals: Var<u8>,
    /// Total supply
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner -> spender -> amount)
    allowances: Mapping<(Address, Address), U256>,
    /// Asset registry address (for admin checks)
    registry: Var<Address>,
    /// Addresses allowed to mint and burn
    authorized_minters: Mapping<Address, bool>,
}

#[odra::module]
impl SynthToken {
    /// Initialize the token
    pub fn init(&mut self, name: String, symbol: String, decimals: u8, registry: Address) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
        self.registry.set(registry);
    }

    // ========== CEP-18 Standard Functions ==========

    /// Get token name
    pub fn name(&self) -> String {
        self.name.get().unwrap_or_default()
    }

    /// Get token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_default()
    }

    /// Get decimals
    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(18)
    }

    /// Get total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    /// Get balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(ExchangeError::InsufficientTokenBalance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.allowances.set(&(owner, spender), current_allowance - amount);
        true
    }

    // ========== Engine Functions (Restricted) ==========

    /// Mint new tokens (only authorized minters)
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.require_authorized_minter();

        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.balances.set(&to, new_balance);

        let new_supply = self
            .total_supply()
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.total_supply.set(new_supply);
    }

    /// Burn tokens from an account (only authorized minters)
    pub fn burn_from(&mut self, from: Address, amount: U256) {
        self.require_authorized_minter();

        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(ExchangeError::InsufficientTokenBalance);
        }
        self.balances.set(&from, current_balance - amount);

        let new_supply = self
            .total_supply()
            .checked_sub(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.total_supply.set(new_supply);
    }

    // ========== Admin Functions ==========

    /// Add an authorized minter (registry admin only)
    pub fn add_minter(&mut self, minter: Address) {
        self.require_registry_admin();
        self.authorized_minters.set(&minter, true);
    }

    /// Remove an authorized minter (registry admin only)
    pub fn remove_minter(&mut self, minter: Address) {
        self.require_registry_admin();
        self.authorized_minters.set(&minter, false);
    }

    /// Check if address is authorized minter
    pub fn is_minter(&self, account: Address) -> bool {
        self.authorized_minters.get(&account).unwrap_or(false)
    }

    /// Get registry address
    pub fn get_registry(&self) -> Option<Address> {
        self.registry.get()
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(ExchangeError::InsufficientTokenBalance);
        }
        self.balances.set(&from, from_balance - amount);

        let new_to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ExchangeError::AccountingInvariant));
        self.balances.set(&to, new_to_balance);
    }

    fn require_authorized_minter(&self) {
        let caller = self.env().caller();
        if !self.is_minter(caller) {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }

    fn require_registry_admin(&self) {
        let caller = self.env().caller();
        let registry = match self.registry.get() {
            Some(registry) => registry,
            None => self.env().revert(ExchangeError::InvalidConfig),
        };

        let args = runtime_args! {
            "caller" => caller
        };
        let call_def = CallDef::new("is_admin", false, args);
        let is_admin: bool = self.env().call_contract(registry, call_def);

        if !is_admin {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }
}

/// Token interface for cross-contract calls
#[odra::external_contract]
pub trait FungibleToken {
    /// Get balance of an account
    fn balance_of(&self, account: Address) -> U256;
    /// Transfer tokens to recipient
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    /// Transfer tokens from owner to recipient
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    /// Mint new tokens
    fn mint(&mut self, to: Address, amount: U256);
    /// Burn tokens from an account
    fn burn_from(&mut self, from: Address, amount: U256);
}
