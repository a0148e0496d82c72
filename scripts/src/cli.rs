//! Definitions of CLI arguments for the seeding script

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{
    DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_DEPLOYMENTS_PATH,
    DEFAULT_GAS_FLOOR, DEFAULT_GAS_MARGIN, DEFAULT_INITIAL_SUPPLY, DEFAULT_PRIV_KEY,
    DEFAULT_RESERVE_BPS, DEFAULT_RPC_URL, DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL,
};

/// Seed a property: create its share token, vault, and rent distributor,
/// then link them through the registry.
///
/// Assumes the registry has already been deployed by the migration.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PRIV_KEY", default_value = DEFAULT_PRIV_KEY)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to the deployments file written by the migration
    #[arg(short, long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Share token name
    #[arg(long, default_value = DEFAULT_TOKEN_NAME)]
    pub name: String,

    /// Share token symbol
    #[arg(long, default_value = DEFAULT_TOKEN_SYMBOL)]
    pub symbol: String,

    /// Number of shares minted to the deployer
    #[arg(long, default_value_t = DEFAULT_INITIAL_SUPPLY)]
    pub initial_supply: u64,

    /// Fraction of rent held in reserve, in basis points
    #[arg(long, default_value_t = DEFAULT_RESERVE_BPS)]
    pub reserve_bps: u16,

    /// Smallest gas limit attached to a transaction
    #[arg(long, default_value_t = DEFAULT_GAS_FLOOR)]
    pub gas_floor: u64,

    /// Headroom kept below the block gas limit
    #[arg(long, default_value_t = DEFAULT_GAS_MARGIN)]
    pub gas_margin: u64,

    /// Seconds to wait for each transaction to be confirmed
    #[arg(long, default_value_t = DEFAULT_CONFIRMATION_TIMEOUT_SECS)]
    pub confirmation_timeout: u64,

    /// Print failure diagnostics as JSON
    #[arg(long)]
    pub json_diagnostics: bool,

    /// Do not write the seeded addresses back to the deployments file
    #[arg(long)]
    pub no_record: bool,
}
