//! Price oracle contract.
//!
//! Stores push-style price feeds keyed by feed address. An authorized
//! feeder publishes `(price, exponent, publish_time)` tuples; consumers
//! read them back and decide for themselves whether a price is fresh
//! enough. The oracle itself never rejects a stale read, it only reports
//! what it has.

use odra::prelude::*;
use odra::casper_types::U256;

use crate::errors::ExchangeError;
use crate::types::PriceFeedData;

/// Price oracle contract
#[odra::module]
pub struct PriceOracle {
    /// Oracle admin address
    admin: Var<Address>,
    /// Addresses allowed to publish prices
    feeders: Mapping<Address, bool>,
    /// Latest published data per feed
    feeds: Mapping<Address, PriceFeedData>,
}

#[odra::module]
impl PriceOracle {
    /// Initialize the oracle. The deployer becomes admin and feeder.
    pub fn init(&mut self) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.feeders.set(&caller, true);
    }

    /// Authorize a feeder address (admin only)
    pub fn add_feeder(&mut self, feeder: Address) {
        self.require_admin();
        self.feeders.set(&feeder, true);
    }

    /// Revoke a feeder address (admin only)
    pub fn remove_feeder(&mut self, feeder: Address) {
        self.require_admin();
        self.feeders.set(&feeder, false);
    }

    /// Publish a price for a feed (feeder only).
    ///
    /// `price * 10^exponent` is the USD price of one whole token.
    /// `publish_time` is the millisecond timestamp of the observation.
    pub fn set_price(&mut self, feed: Address, price: U256, exponent: i32, publish_time: u64) {
        self.require_feeder();
        if price.is_zero() {
            self.env().revert(ExchangeError::InvalidAmount);
        }
        self.feeds.set(
            &feed,
            PriceFeedData {
                price,
                exponent,
                publish_time,
            },
        );
    }

    /// Latest data for a feed, if any has been published
    pub fn get_price(&self, feed: Address) -> Option<PriceFeedData> {
        self.feeds.get(&feed)
    }

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Check whether an address may publish prices
    pub fn is_feeder(&self, address: Address) -> bool {
        self.feeders.get(&address).unwrap_or(false)
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }

    fn require_feeder(&self) {
        let caller = self.env().caller();
        if !self.is_feeder(caller) {
            self.env().revert(ExchangeError::Unauthorized);
        }
    }
}

/// Oracle interface for cross-contract calls
#[odra::external_contract]
pub trait PriceFeed {
    /// Latest data for a feed, if any has been published
    fn get_price(&self, feed: Address) -> Option<PriceFeedData>;
}
