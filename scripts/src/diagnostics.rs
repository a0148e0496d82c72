//! Structured failure reports for the operator
//!
//! A [`Diagnostic`] separates what is known about the failed transaction from
//! the error message itself, so a failure before submission never reads as a
//! transaction with zeroed fields.

use std::fmt::{self, Display, Formatter};

use alloy_primitives::TxHash;
use serde::Serialize;

use crate::{
    errors::{SeedError, StepFailure},
    types::Step,
};

/// What is known about the transaction involved in a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TxDetail {
    /// No transaction was sent
    NotSubmitted,
    /// Every transaction in the sequence confirmed
    AllConfirmed,
    /// A transaction was sent; fields are absent when no receipt was observed
    Submitted {
        /// The transaction hash
        tx_hash: TxHash,
        /// The execution status, if a receipt was observed
        status: Option<bool>,
        /// The gas consumed, if a receipt was observed
        gas_used: Option<u64>,
        /// The including block, if a receipt was observed
        block_number: Option<u64>,
    },
}

impl TxDetail {
    /// Detail for a transaction that has no receipt
    fn unconfirmed(tx_hash: TxHash) -> Self {
        TxDetail::Submitted {
            tx_hash,
            status: None,
            gas_used: None,
            block_number: None,
        }
    }

    /// Detail for a failed step
    fn of_failure(failure: &StepFailure) -> Self {
        match &failure.receipt {
            Some(receipt) => TxDetail::Submitted {
                tx_hash: receipt.tx_hash,
                status: Some(receipt.status),
                gas_used: Some(receipt.gas_used),
                block_number: receipt.block_number,
            },
            None => TxDetail::NotSubmitted,
        }
    }
}

/// A structured report of a failed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// A stable identifier for the error kind
    pub kind: &'static str,
    /// Whether every transaction confirmed before the failure
    pub deployed: bool,
    /// The step that failed, if the failure happened inside the sequence
    pub step: Option<Step>,
    /// The transaction involved, if any
    pub transaction: TxDetail,
    /// The error message
    pub message: String,
    /// What the operator should do next
    pub action: &'static str,
}

impl Diagnostic {
    /// Build a diagnostic from a seeding error
    pub fn from_error(err: &SeedError) -> Self {
        let message = err.to_string();
        let deployed = err.after_deployment();
        let (kind, step, transaction, action) = match err {
            SeedError::ClientInitialization(_) => (
                "client_initialization",
                None,
                TxDetail::NotSubmitted,
                "check the RPC url and private key",
            ),
            SeedError::ReadDeployments(_) => (
                "read_deployments",
                None,
                TxDetail::NotSubmitted,
                "run the registry migration first",
            ),
            SeedError::WriteDeployments(_) => (
                "write_deployments",
                None,
                TxDetail::AllConfirmed,
                "the property was seeded; record the logged addresses by hand",
            ),
            SeedError::ArtifactParsing(_) => (
                "artifact_parsing",
                None,
                TxDetail::NotSubmitted,
                "compile the contracts before seeding",
            ),
            SeedError::CalldataConstruction(_) => (
                "calldata_construction",
                None,
                TxDetail::NotSubmitted,
                "fix the seeding parameters",
            ),
            SeedError::NetworkUnavailable { step, tx_hash, .. } => (
                "network_unavailable",
                *step,
                tx_hash.map_or(TxDetail::NotSubmitted, TxDetail::unconfirmed),
                "check the node is reachable; inspect any submitted transaction before re-running",
            ),
            SeedError::CapacityTooLow { .. } => (
                "capacity_too_low",
                None,
                TxDetail::NotSubmitted,
                "lower the gas floor or target a network with a higher block gas limit",
            ),
            SeedError::DeploymentFailed(failure) => (
                "deployment_failed",
                Some(failure.step),
                TxDetail::of_failure(failure),
                "components created before this step are abandoned; re-run to seed anew",
            ),
            SeedError::FinalizeRejected(failure) => (
                "finalize_rejected",
                Some(failure.step),
                TxDetail::of_failure(failure),
                "the registry rejected the linkage; fix the parameters (e.g. reserve bps) and re-run",
            ),
            SeedError::ConfirmationTimeout { step, tx_hash, .. } => (
                "confirmation_timeout",
                Some(*step),
                TxDetail::unconfirmed(*tx_hash),
                "check whether the transaction landed before re-running to avoid a duplicate",
            ),
            SeedError::Aborted { step, tx_hash } => (
                "aborted",
                Some(*step),
                tx_hash.map_or(TxDetail::NotSubmitted, TxDetail::unconfirmed),
                "a submitted transaction may still land; check it before re-running",
            ),
            SeedError::VerificationReadError(_) => (
                "verification_read_error",
                None,
                TxDetail::AllConfirmed,
                "the deployment most likely succeeded; read the token state manually",
            ),
        };

        Self {
            kind,
            deployed,
            step,
            transaction,
            message,
            action,
        }
    }

    /// Render the diagnostic as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.deployed {
            writeln!(f, "seed_property succeeded, follow-up failed: {}", self.message)?;
        } else {
            writeln!(f, "seed_property failed: {}", self.message)?;
        }
        writeln!(f, "  kind: {}", self.kind)?;
        if let Some(step) = self.step {
            writeln!(f, "  step: {}", step)?;
        }

        match &self.transaction {
            TxDetail::NotSubmitted => writeln!(f, "  transaction: not submitted")?,
            TxDetail::AllConfirmed => writeln!(f, "  transaction: all steps confirmed")?,
            TxDetail::Submitted {
                tx_hash,
                status,
                gas_used,
                block_number,
            } => {
                writeln!(f, "  txHash: {}", tx_hash)?;
                match status {
                    Some(true) => writeln!(f, "  status: success")?,
                    Some(false) => writeln!(f, "  status: failed")?,
                    None => writeln!(f, "  status: unknown (no receipt observed)")?,
                }
                if let Some(gas_used) = gas_used {
                    writeln!(f, "  gasUsed: {}", gas_used)?;
                }
                if let Some(block_number) = block_number {
                    writeln!(f, "  block: {}", block_number)?;
                }
            }
        }

        write!(f, "  action: {}", self.action)
    }
}
