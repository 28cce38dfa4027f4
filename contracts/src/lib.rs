//! CSPR-Synth Contracts
//!
//! Casper-native synthetic asset exchange with pooled debt accounting.
//!
//! ## Architecture
//!
//! - **Exchange**: User entry point for collateral accounts, minting,
//!   repayment and synthetic swaps against a shared debt pool
//! - **AssetRegistry**: Bounded table of collateral and synthetic assets
//!   with engine-gated reserve and supply counters
//! - **SynthToken**: CEP-18 style synthetic token, one instance per asset,
//!   minted and burned only by the exchange engine
//! - **PriceOracle**: Push-style price feeds published by authorized
//!   feeders; consumers enforce freshness themselves
//!
//! ## Debt Pool
//!
//! Debt is tracked as shares of a common pool. The per-share USD value
//! starts at 1.0 (1e18) and only grows as swap fees accrue, so every
//! debtor's obligation scales proportionally. When the last share is
//! burned the value resets to 1.0.
//!
//! ## Halt Switch
//!
//! The engine admin can halt the exchange. While halted, deposit,
//! withdraw, mint, burn and swap revert; reads and admin operations
//! remain available.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod errors;
pub mod math;
pub mod types;

// Contract modules
pub mod exchange;
pub mod oracle;
pub mod registry;
pub mod token;
