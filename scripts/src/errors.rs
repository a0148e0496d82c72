//! Definitions of errors that can occur while seeding a property

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    time::Duration,
};

use alloy_primitives::TxHash;

use crate::types::{Step, StepReceipt};

/// A step whose transaction did not execute successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// The step that failed
    pub step: Step,
    /// A description of the failure
    pub reason: String,
    /// The receipt of the failed transaction, absent if it was never submitted
    pub receipt: Option<StepReceipt>,
}

impl StepFailure {
    /// Wrap the failure in the error kind appropriate for its step
    pub fn into_error(self) -> SeedError {
        match self.step {
            Step::Finalize => SeedError::FinalizeRejected(self),
            _ => SeedError::DeploymentFailed(self),
        }
    }
}

/// Errors that can occur while seeding a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// Error initializing the RPC client or signer
    ClientInitialization(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error parsing a contract build artifact
    ArtifactParsing(String),
    /// Error constructing the calldata for a step
    CalldataConstruction(String),
    /// The network could not be reached
    NetworkUnavailable {
        /// The step in progress, if any
        step: Option<Step>,
        /// The transaction already submitted for that step, if any
        tx_hash: Option<TxHash>,
        /// The underlying transport error
        reason: String,
    },
    /// The configured gas floor exceeds the network's block gas limit
    CapacityTooLow {
        /// The block gas limit reported by the network
        capacity: u64,
        /// The configured gas floor
        floor: u64,
    },
    /// A component creation step did not succeed
    DeploymentFailed(StepFailure),
    /// The registry rejected the finalize call
    FinalizeRejected(StepFailure),
    /// A submitted transaction was not confirmed in time
    ConfirmationTimeout {
        /// The step awaiting confirmation
        step: Step,
        /// The unconfirmed transaction
        tx_hash: TxHash,
        /// How long the sequencer waited
        waited: Duration,
    },
    /// The run was interrupted by the operator
    Aborted {
        /// The step in progress
        step: Step,
        /// The transaction in flight, whose fate is unknown
        tx_hash: Option<TxHash>,
    },
    /// Reading back post-deployment state failed
    VerificationReadError(String),
}

impl SeedError {
    /// The process exit code to report for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            SeedError::VerificationReadError(_) => 2,
            SeedError::WriteDeployments(_) => 3,
            _ => 1,
        }
    }

    /// Whether the error was raised after every transaction confirmed
    pub fn after_deployment(&self) -> bool {
        matches!(
            self,
            SeedError::VerificationReadError(_) | SeedError::WriteDeployments(_)
        )
    }
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            SeedError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            SeedError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            SeedError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            SeedError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            SeedError::NetworkUnavailable { step: Some(step), reason, .. } => {
                write!(f, "network unavailable during {} step: {}", step, reason)
            }
            SeedError::NetworkUnavailable { step: None, reason, .. } => {
                write!(f, "network unavailable: {}", reason)
            }
            SeedError::CapacityTooLow { capacity, floor } => write!(
                f,
                "block gas limit {} is below the gas floor {}",
                capacity, floor
            ),
            SeedError::DeploymentFailed(failure) => {
                write!(f, "{} deployment failed: {}", failure.step, failure.reason)
            }
            SeedError::FinalizeRejected(failure) => {
                write!(f, "finalize rejected by registry: {}", failure.reason)
            }
            SeedError::ConfirmationTimeout { step, tx_hash, waited } => write!(
                f,
                "{} transaction {} not confirmed after {}s",
                step,
                tx_hash,
                waited.as_secs()
            ),
            SeedError::Aborted { step, tx_hash: Some(tx_hash) } => write!(
                f,
                "aborted while awaiting {} transaction {}",
                step, tx_hash
            ),
            SeedError::Aborted { step, tx_hash: None } => {
                write!(f, "aborted before submitting {} transaction", step)
            }
            SeedError::VerificationReadError(s) => write!(f, "error reading back state: {}", s),
        }
    }
}

impl Error for SeedError {}
