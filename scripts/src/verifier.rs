//! Post-deployment read-back of the share token's state

use std::{fmt::Display, time::Duration};

use alloy_primitives::{Address, U256};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    errors::SeedError,
    network::DeployNetwork,
    sequencer::{bounded, Interrupted},
    types::Verification,
};

/// Read the token's total supply and the administrator's balance.
///
/// These are plain calls; a failure here says nothing about whether the
/// deployment itself succeeded. Each read is bounded by `timeout` and the
/// abort signal.
pub async fn verify_deployment<N: DeployNetwork>(
    network: &N,
    token: Address,
    admin: Address,
    timeout: Duration,
    mut abort_signal: Option<&mut watch::Receiver<bool>>,
) -> Result<Verification, SeedError> {
    let total_supply = bounded(
        network.total_supply(token),
        timeout,
        abort_signal.as_deref_mut(),
    )
    .await
    .map_err(|e| read_error("totalSupply", interrupted_reason(e, timeout)))?
    .map_err(|e| read_error("totalSupply", e))?;
    let admin_balance = bounded(network.balance_of(token, admin), timeout, abort_signal)
        .await
        .map_err(|e| read_error("balanceOf", interrupted_reason(e, timeout)))?
        .map_err(|e| read_error("balanceOf", e))?;

    info!("Token totalSupply: {}", total_supply);
    info!("Admin balance: {}", admin_balance);

    Ok(Verification {
        total_supply,
        admin_balance,
    })
}

fn read_error(call: &str, reason: impl Display) -> SeedError {
    SeedError::VerificationReadError(format!("{call}: {reason}"))
}

fn interrupted_reason(interrupted: Interrupted, timeout: Duration) -> String {
    match interrupted {
        Interrupted::TimedOut => format!("no response within {}s", timeout.as_secs_f64()),
        Interrupted::Aborted => "aborted by operator".to_string(),
    }
}

/// Warn if the read-back state does not match what the token was created with
pub fn check_initial_supply(verification: &Verification, initial_supply: U256) -> bool {
    let matches = verification.total_supply == initial_supply
        && verification.admin_balance == initial_supply;
    if !matches {
        warn!(
            expected = %initial_supply,
            total_supply = %verification.total_supply,
            admin_balance = %verification.admin_balance,
            "token state differs from the initial supply"
        );
    }

    matches
}
