//! Implementation of the property seeding script

use std::{path::Path, time::Duration};

use alloy_primitives::{Address, U256};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    budget::gas_budget,
    cli::Cli,
    constants::{MAX_RESERVE_BPS, RECEIPT_POLL_INTERVAL_MS},
    errors::SeedError,
    network::{AlloyNetwork, DeployNetwork, NetworkError},
    sequencer::{bounded, Interrupted, SequenceInputs, Sequencer},
    types::{ComponentKind, PropertyParams, SeedOutcome, Step},
    utils::{
        read_contract_artifacts, read_registry_deployment, setup_client, write_deployed_addresses,
    },
    verifier::{check_initial_supply, verify_deployment},
};

/// Everything a seeding run needs besides the network itself
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// The registry deployed by the migration
    pub registry: Address,
    /// The account sending every transaction
    pub deployer: Address,
    /// The property being seeded
    pub property: PropertyParams,
    /// The smallest gas limit attached to a transaction
    pub gas_floor: u64,
    /// The headroom kept below the block gas limit
    pub gas_margin: u64,
    /// How long to wait for each transaction to be confirmed
    pub confirmation_timeout: Duration,
}

/// Query the block gas limit, derive the gas budget, run the sequence, and read back
/// the token's state.
///
/// A verification failure does not fail the run; it is returned inside the
/// outcome. The gas limit query and the reads are bounded by the confirmation timeout
/// and the abort signal like every confirmation is.
pub async fn seed_property<N: DeployNetwork>(
    network: &N,
    config: &SeedConfig,
    mut abort_signal: Option<watch::Receiver<bool>>,
) -> Result<SeedOutcome, SeedError> {
    let capacity = fetch_gas_limit(network, config.confirmation_timeout, abort_signal.as_mut()).await?;
    info!("Block gas limit: {}", capacity);

    let budget = gas_budget(capacity, config.gas_floor, config.gas_margin)?;
    info!("Gas budget per transaction: {}", budget);

    if config.property.reserve_bps > MAX_RESERVE_BPS {
        warn!(
            reserve_bps = config.property.reserve_bps,
            "reserve exceeds {} bps, the registry is expected to reject finalize", MAX_RESERVE_BPS
        );
    }

    let mut sequencer = Sequencer::new(network, budget, config.confirmation_timeout);
    if let Some(abort_signal) = &abort_signal {
        sequencer = sequencer.with_abort_signal(abort_signal.clone());
    }

    let inputs = SequenceInputs {
        registry: config.registry,
        deployer: config.deployer,
        property: config.property.clone(),
    };
    let output = sequencer.run(&inputs).await?;

    let verification = verify_deployment(
        network,
        output.linkage.token,
        config.deployer,
        config.confirmation_timeout,
        abort_signal.as_mut(),
    )
    .await;
    let supply_matches = verification
        .as_ref()
        .ok()
        .map(|v| check_initial_supply(v, config.property.initial_supply));

    Ok(SeedOutcome {
        budget,
        records: output.records,
        finalize_receipt: output.finalize_receipt,
        verification,
        supply_matches,
        recording: None,
    })
}

/// Fetch the network's block gas limit, bounded by the confirmation timeout
/// and the abort signal
async fn fetch_gas_limit<N: DeployNetwork>(
    network: &N,
    timeout: Duration,
    abort_signal: Option<&mut watch::Receiver<bool>>,
) -> Result<u64, SeedError> {
    let unavailable = |reason| SeedError::NetworkUnavailable {
        step: None,
        tx_hash: None,
        reason,
    };

    match bounded(network.block_gas_limit(), timeout, abort_signal).await {
        Ok(Ok(capacity)) => Ok(capacity),
        Ok(Err(NetworkError::Unavailable(reason) | NetworkError::Rejected(reason))) => {
            Err(unavailable(reason))
        }
        Err(Interrupted::TimedOut) => Err(unavailable(format!(
            "no block gas limit within {}s",
            timeout.as_secs_f64()
        ))),
        Err(Interrupted::Aborted) => Err(SeedError::Aborted {
            step: Step::SEQUENCE[0],
            tx_hash: None,
        }),
    }
}

/// Write the seeded addresses to the deployments file, keeping the result in
/// the outcome so a failed write never hides a confirmed deployment
pub fn record_outcome(deployments_path: &Path, outcome: &mut SeedOutcome) {
    let res = write_deployed_addresses(deployments_path, &outcome.records);
    match &res {
        Ok(()) => info!("Wrote seeded addresses to {}", deployments_path.display()),
        Err(e) => warn!("failed to record seeded addresses: {}", e),
    }

    outcome.recording = Some(res);
}

/// Run the seeding script as configured on the command line
pub async fn run(
    cli: Cli,
    abort_signal: watch::Receiver<bool>,
) -> Result<SeedOutcome, SeedError> {
    let registry = read_registry_deployment(&cli.deployments_path)?;
    match &registry.network {
        Some(network) => info!("DAO: {:#x} ({})", registry.address, network),
        None => info!("DAO: {:#x}", registry.address),
    }

    let artifacts = read_contract_artifacts(&cli.artifacts_dir)?;
    let (provider, deployer) = setup_client(&cli.priv_key, &cli.rpc_url)?;
    let network = AlloyNetwork::new(
        provider,
        artifacts,
        Duration::from_millis(RECEIPT_POLL_INTERVAL_MS),
    );

    let config = SeedConfig {
        registry: registry.address,
        deployer,
        property: PropertyParams {
            name: cli.name,
            symbol: cli.symbol,
            initial_supply: U256::from(cli.initial_supply),
            reserve_bps: cli.reserve_bps,
        },
        gas_floor: cli.gas_floor,
        gas_margin: cli.gas_margin,
        confirmation_timeout: Duration::from_secs(cli.confirmation_timeout),
    };

    let mut outcome = seed_property(&network, &config, Some(abort_signal)).await?;
    if !cli.no_record {
        record_outcome(&cli.deployments_path, &mut outcome);
    }

    Ok(outcome)
}

/// Print the addresses and read-back state of a successful run
pub fn print_summary(outcome: &SeedOutcome) {
    for kind in [
        ComponentKind::Registry,
        ComponentKind::Token,
        ComponentKind::Vault,
        ComponentKind::Distributor,
    ] {
        if let Some(address) = outcome.address_of(kind) {
            println!("{}: {:#x}", kind.contract_name(), address);
        }
    }
    println!("finalizePropertyLite tx: {}", outcome.finalize_receipt.tx_hash);

    if let Ok(verification) = &outcome.verification {
        println!("Token totalSupply: {}", verification.total_supply);
        println!("Admin balance: {}", verification.admin_balance);
    }
    if outcome.supply_matches == Some(false) {
        println!("Warning: token state differs from the initial supply");
    }
}
