//! Deploy contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000

use odra::casper_types::U256;
use odra::host::{Deployer, NoArgs};
use odra::prelude::*;

use cspr_synth_contracts::exchange::{Exchange, ExchangeInitArgs};
use cspr_synth_contracts::oracle::PriceOracle;
use cspr_synth_contracts::registry::{AssetRegistry, AssetRegistryInitArgs};
use cspr_synth_contracts::token::{SynthToken, SynthTokenInitArgs};

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== CSPR-Synth Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = std::env::var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200_000_000_000);
    env.set_gas(payment_amount);

    // Get deployer address
    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // Protocol parameters
    let collateral_ratio_permille: u32 = 500; // 2x over-collateralization
    let max_reserve_limit = U256::from(1_000_000_000u64) * U256::from(10u64).pow(U256::from(9u64));
    let usd_max_supply = U256::from(10_000_000u64) * U256::from(10u64).pow(U256::from(18u64));
    // Initial collateral price: $0.02 with exponent -18
    let initial_price = U256::from(20_000_000_000_000_000u128);

    // ==================== Phase 1: Independent Contracts ====================
    println!("=== Phase 1: Deploying Independent Contracts ===");
    println!();

    println!("Deploying PriceOracle...");
    let mut oracle = PriceOracle::deploy(&env, NoArgs);
    let oracle_addr = oracle.address().clone();
    println!("PriceOracle deployed at: {:?}", oracle_addr);

    println!("Deploying AssetRegistry...");
    let mut registry = AssetRegistry::deploy(&env, AssetRegistryInitArgs { admin: deployer });
    let registry_addr = registry.address().clone();
    println!("AssetRegistry deployed at: {:?}", registry_addr);

    println!();

    // ==================== Phase 2: Engine and Tokens ====================
    println!("=== Phase 2: Deploying Engine and Tokens ===");
    println!();

    println!("Deploying Exchange...");
    let mut exchange = Exchange::deploy(
        &env,
        ExchangeInitArgs {
            admin: deployer,
            registry: registry_addr,
            oracle: oracle_addr,
        },
    );
    let exchange_addr = exchange.address().clone();
    println!("Exchange deployed at: {:?}", exchange_addr);

    println!("Deploying Wrapped CSPR collateral token...");
    let mut collateral_token = SynthToken::deploy(
        &env,
        SynthTokenInitArgs {
            name: String::from("Wrapped CSPR"),
            symbol: String::from("wCSPR"),
            decimals: 9,
            registry: registry_addr,
        },
    );
    let collateral_token_addr = collateral_token.address().clone();
    println!("Wrapped CSPR deployed at: {:?}", collateral_token_addr);

    println!("Deploying Synthetic USD token...");
    let mut usd_token = SynthToken::deploy(
        &env,
        SynthTokenInitArgs {
            name: String::from("Synthetic USD"),
            symbol: String::from("sUSD"),
            decimals: 18,
            registry: registry_addr,
        },
    );
    let usd_token_addr = usd_token.address().clone();
    println!("Synthetic USD deployed at: {:?}", usd_token_addr);

    println!();

    // ==================== Phase 3: Cross-contract Configuration ====================
    println!("=== Phase 3: Cross-contract Configuration ===");
    println!();

    println!("Wiring AssetRegistry -> Exchange...");
    registry.set_engine(exchange_addr);
    println!("Done.");

    println!("Authorizing Exchange as minter on Synthetic USD...");
    usd_token.add_minter(exchange_addr);
    println!("Done.");

    // The deployer mints wrapped collateral for initial liquidity
    println!("Authorizing deployer as minter on Wrapped CSPR...");
    collateral_token.add_minter(deployer);
    println!("Done.");

    // The collateral token address doubles as its feed key
    println!("Publishing initial collateral price...");
    oracle.set_price(
        collateral_token_addr,
        initial_price,
        -18,
        env.block_time(),
    );
    println!("Done.");

    println!("Seeding registry entries...");
    exchange.seed_registry(
        collateral_token_addr,
        collateral_token_addr,
        collateral_ratio_permille,
        max_reserve_limit,
        usd_token_addr,
        usd_max_supply,
    );
    println!("Done.");

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  PriceOracle:    {:?}", oracle_addr);
    println!("  AssetRegistry:  {:?}", registry_addr);
    println!("  Exchange:       {:?}", exchange_addr);
    println!("  Wrapped CSPR:   {:?}", collateral_token_addr);
    println!("  Synthetic USD:  {:?}", usd_token_addr);
}
