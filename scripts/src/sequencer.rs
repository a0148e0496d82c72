//! The ordered, dependent creation and linking of a property's components
//!
//! Each step is built from the records confirmed before it, submitted with the
//! run's gas budget, and awaited to confirmation before the next step is built.
//! The first step that does not confirm successfully ends the sequence; the
//! components created up to that point are left unlinked.

use std::{
    future::{self, Future},
    time::Duration,
};

use alloy_primitives::{Address, TxHash};
use itertools::Itertools;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    errors::{SeedError, StepFailure},
    network::{DeployNetwork, NetworkError},
    types::{
        record_address, ComponentKind, CreationParams, DeploymentRecord, FinalizeLinkage,
        PropertyParams, Step, StepCall, StepReceipt,
    },
};

/// The inputs to a seeding sequence that are known before it starts
#[derive(Debug, Clone)]
pub struct SequenceInputs {
    /// The registry deployed by the migration
    pub registry: Address,
    /// The account sending every transaction; it receives the initial
    /// supply, manages the vault, and is granted the registry's admin role
    pub deployer: Address,
    /// The property being seeded
    pub property: PropertyParams,
}

/// The result of a sequence in which every step confirmed successfully
#[derive(Debug, Clone)]
pub struct SequenceOutput {
    /// The registry followed by the token, vault, and distributor records
    pub records: Vec<DeploymentRecord>,
    /// The linkage submitted to the registry
    pub linkage: FinalizeLinkage,
    /// The finalize transaction's receipt
    pub finalize_receipt: StepReceipt,
}

/// Build the call for a step from the records confirmed so far.
///
/// Every address a step references is looked up among `records`, so a step
/// can only ever reference components created earlier in the same run.
pub fn build_step_call(
    step: Step,
    inputs: &SequenceInputs,
    records: &[DeploymentRecord],
) -> Result<StepCall, SeedError> {
    let call = match step {
        Step::Token => StepCall::Create(CreationParams::Token {
            name: inputs.property.name.clone(),
            symbol: inputs.property.symbol.clone(),
            admin: record_address(records, ComponentKind::Registry)?,
            initial_holder: inputs.deployer,
            initial_supply: inputs.property.initial_supply,
        }),
        Step::Vault => StepCall::Create(CreationParams::Vault {
            registry: record_address(records, ComponentKind::Registry)?,
            property_manager: inputs.deployer,
        }),
        Step::Distributor => StepCall::Create(CreationParams::Distributor {
            token: record_address(records, ComponentKind::Token)?,
            vault: record_address(records, ComponentKind::Vault)?,
        }),
        Step::Finalize => StepCall::Finalize(FinalizeLinkage {
            registry: record_address(records, ComponentKind::Registry)?,
            token: record_address(records, ComponentKind::Token)?,
            vault: record_address(records, ComponentKind::Vault)?,
            distributor: record_address(records, ComponentKind::Distributor)?,
            admin: inputs.deployer,
            reserve_bps: inputs.property.reserve_bps,
        }),
    };

    Ok(call)
}

/// Executes the seeding steps against a network, one at a time
pub struct Sequencer<'a, N> {
    /// The network to submit to
    network: &'a N,
    /// The gas limit attached to every transaction
    budget: u64,
    /// How long to wait for each transaction to confirm
    confirmation_timeout: Duration,
    /// Flips to `true` when the operator asks the run to stop
    abort_signal: Option<watch::Receiver<bool>>,
}

impl<'a, N: DeployNetwork> Sequencer<'a, N> {
    /// Constructor
    pub fn new(network: &'a N, budget: u64, confirmation_timeout: Duration) -> Self {
        Self {
            network,
            budget,
            confirmation_timeout,
            abort_signal: None,
        }
    }

    /// Stop the sequence once the given signal reads `true`
    pub fn with_abort_signal(mut self, abort_signal: watch::Receiver<bool>) -> Self {
        self.abort_signal = Some(abort_signal);
        self
    }

    /// Run every step in order, returning the confirmed records
    pub async fn run(&mut self, inputs: &SequenceInputs) -> Result<SequenceOutput, SeedError> {
        info!(
            "seeding {} ({}): {}",
            inputs.property.name,
            inputs.property.symbol,
            Step::SEQUENCE.iter().join(" -> ")
        );

        let mut records = vec![DeploymentRecord::registry(inputs.registry)];
        let mut finalized = None;

        for step in Step::SEQUENCE {
            let call = build_step_call(step, inputs, &records)?;
            let receipt = self.execute(step, &call).await?;

            match call {
                StepCall::Create(params) => {
                    let record = created_record(step, params, receipt)?;
                    info!("{} deployed at {:#x}", record.kind.contract_name(), record.address);
                    records.push(record);
                }
                StepCall::Finalize(linkage) => {
                    info!("finalizePropertyLite tx: {}", receipt.tx_hash);
                    finalized = Some((linkage, receipt));
                }
            }
        }

        let (linkage, finalize_receipt) = finalized.ok_or_else(|| {
            SeedError::CalldataConstruction("sequence ended without a finalize step".to_string())
        })?;

        Ok(SequenceOutput {
            records,
            linkage,
            finalize_receipt,
        })
    }

    /// Submit a step and wait for it to confirm successfully
    async fn execute(&mut self, step: Step, call: &StepCall) -> Result<StepReceipt, SeedError> {
        if self.abort_requested() {
            return Err(SeedError::Aborted {
                step,
                tx_hash: None,
            });
        }

        info!(%step, gas_limit = self.budget, "submitting");
        let tx_hash = self
            .network
            .submit(call, self.budget)
            .await
            .map_err(|e| match e {
                NetworkError::Unavailable(reason) => SeedError::NetworkUnavailable {
                    step: Some(step),
                    tx_hash: None,
                    reason,
                },
                NetworkError::Rejected(reason) => StepFailure {
                    step,
                    reason,
                    receipt: None,
                }
                .into_error(),
            })?;
        info!(%step, %tx_hash, "submitted, awaiting confirmation");

        let receipt = self.await_confirmation(step, tx_hash).await?;
        if !receipt.status {
            return Err(StepFailure {
                step,
                reason: "transaction reverted".to_string(),
                receipt: Some(receipt),
            }
            .into_error());
        }

        Ok(receipt)
    }

    /// Wait for a submitted transaction's receipt, bounded by the confirmation
    /// timeout and the abort signal
    async fn await_confirmation(
        &mut self,
        step: Step,
        tx_hash: TxHash,
    ) -> Result<StepReceipt, SeedError> {
        let network = self.network;
        let res = bounded(
            network.wait_for_receipt(tx_hash),
            self.confirmation_timeout,
            self.abort_signal.as_mut(),
        )
        .await;

        match res {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => Err(SeedError::NetworkUnavailable {
                step: Some(step),
                tx_hash: Some(tx_hash),
                reason: e.to_string(),
            }),
            Err(Interrupted::TimedOut) => Err(SeedError::ConfirmationTimeout {
                step,
                tx_hash,
                waited: self.confirmation_timeout,
            }),
            Err(Interrupted::Aborted) => {
                warn!(%step, %tx_hash, "aborted with transaction in flight");
                Err(SeedError::Aborted {
                    step,
                    tx_hash: Some(tx_hash),
                })
            }
        }
    }

    /// Whether the abort signal has already fired
    fn abort_requested(&self) -> bool {
        self.abort_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }
}

/// Why a bounded network call did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupted {
    /// The timeout expired first
    TimedOut,
    /// The operator asked the run to stop
    Aborted,
}

/// Await a network call, giving up when the timeout expires or the abort
/// signal fires, whichever comes first
pub(crate) async fn bounded<F: Future>(
    fut: F,
    timeout: Duration,
    abort_signal: Option<&mut watch::Receiver<bool>>,
) -> Result<F::Output, Interrupted> {
    let fut = tokio::time::timeout(timeout, fut);
    match abort_signal {
        Some(signal) => tokio::select! {
            biased;
            _ = abort_requested(signal) => Err(Interrupted::Aborted),
            res = fut => res.map_err(|_| Interrupted::TimedOut),
        },
        None => fut.await.map_err(|_| Interrupted::TimedOut),
    }
}

/// Resolves once the signal reads `true`; never resolves if the sender is gone
async fn abort_requested(signal: &mut watch::Receiver<bool>) {
    if signal.wait_for(|aborted| *aborted).await.is_err() {
        future::pending::<()>().await;
    }
}

/// Turn a creation step's receipt into a deployment record
fn created_record(
    step: Step,
    params: CreationParams,
    receipt: StepReceipt,
) -> Result<DeploymentRecord, SeedError> {
    let Some(address) = receipt.contract_address else {
        return Err(StepFailure {
            step,
            reason: "receipt does not carry a contract address".to_string(),
            receipt: Some(receipt),
        }
        .into_error());
    };

    Ok(DeploymentRecord {
        kind: params.kind(),
        address,
        params,
        tx_hash: Some(receipt.tx_hash),
    })
}
