//! Protocol error definitions.

use odra::prelude::*;

/// Synthetic exchange errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ExchangeError {
    // Access / lifecycle errors (1xx)
    Unauthorized = 100,
    Halted = 101,
    AccountAlreadyExists = 102,
    AccountNotFound = 103,

    // Registry errors (2xx)
    RegistryFull = 200,
    DuplicateFeed = 201,
    AssetNotRegistered = 202,
    SizeMismatch = 203,

    // Collateral errors (3xx)
    ReserveLimitExceeded = 300,
    InsufficientCollateral = 301,

    // Debt errors (4xx)
    MintLimitExceeded = 400,
    MaxSupplyExceeded = 401,

    // Oracle errors (5xx)
    StalePrice = 500,
    OracleUnavailable = 501,

    // Token errors (6xx)
    TransferFailed = 600,
    InsufficientTokenBalance = 601,

    // Swap errors (7xx)
    SelfSwap = 700,

    // Input / configuration errors (9xx)
    InvalidAmount = 900,
    InvalidConfig = 901,

    // Internal invariant violations (10xx) - always fatal to the transaction
    AccountingInvariant = 1000,
}

impl ExchangeError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Access / lifecycle
            ExchangeError::Unauthorized => "Unauthorized: caller is not admin",
            ExchangeError::Halted => "Exchange is halted",
            ExchangeError::AccountAlreadyExists => "Exchange account already exists for this owner",
            ExchangeError::AccountNotFound => "Exchange account not found",

            // Registry
            ExchangeError::RegistryFull => "Asset registry is at capacity",
            ExchangeError::DuplicateFeed => "Price feed already registered",
            ExchangeError::AssetNotRegistered => "Asset not registered for this operation",
            ExchangeError::SizeMismatch => "Account collateral list does not cover this asset",

            // Collateral
            ExchangeError::ReserveLimitExceeded => "Deposit would exceed the reserve limit",
            ExchangeError::InsufficientCollateral => "Insufficient collateral",

            // Debt
            ExchangeError::MintLimitExceeded => "Mint would exceed the collateral-backed debt limit",
            ExchangeError::MaxSupplyExceeded => "Synthetic max supply crossed",

            // Oracle
            ExchangeError::StalePrice => "Oracle price is outdated",
            ExchangeError::OracleUnavailable => "Oracle price unavailable",

            // Token
            ExchangeError::TransferFailed => "Token transfer failed",
            ExchangeError::InsufficientTokenBalance => "Insufficient token balance",

            // Swap
            ExchangeError::SelfSwap => "Swapping an asset for itself is forbidden",

            // Input / configuration
            ExchangeError::InvalidAmount => "Amount must be greater than zero",
            ExchangeError::InvalidConfig => "Invalid configuration parameter",

            // Internal
            ExchangeError::AccountingInvariant => "Internal accounting invariant violated",
        }
    }
}

impl core::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ExchangeError> for OdraError {
    fn from(error: ExchangeError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
