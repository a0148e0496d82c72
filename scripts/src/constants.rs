//! Constants used in the seeding scripts

/// The default RPC url, a dev node on the local machine
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The default private key, the first pre-funded account of a local dev node
pub const DEFAULT_PRIV_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default location of the deployments file written by the migration
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "frontend/src/config/deployments/local.json";

/// The default directory containing the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The key under which the migration records the network name
pub const NETWORK_KEY: &str = "network";

/// The field of a build artifact holding the contract's creation bytecode
pub const ARTIFACT_BYTECODE_KEY: &str = "bytecode";

/// The extension of a build artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The default share token name
pub const DEFAULT_TOKEN_NAME: &str = "Amman Residence";

/// The default share token symbol
pub const DEFAULT_TOKEN_SYMBOL: &str = "AMMN";

/// The default number of shares minted to the deployer
pub const DEFAULT_INITIAL_SUPPLY: u64 = 1_000_000;

/// The default rent reserve fraction, in basis points
pub const DEFAULT_RESERVE_BPS: u16 = 500;

/// The largest reserve fraction the registry accepts, in basis points
pub const MAX_RESERVE_BPS: u16 = 10_000;

/// The smallest gas limit attached to a seeding transaction
pub const DEFAULT_GAS_FLOOR: u64 = 8_000_000;

/// The headroom kept between a seeding transaction and the block gas limit
pub const DEFAULT_GAS_MARGIN: u64 = 1_000_000;

/// The default time to wait for a transaction to be confirmed, in seconds
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// How often to poll for a transaction receipt, in milliseconds
pub const RECEIPT_POLL_INTERVAL_MS: u64 = 250;
