//! A scripted in-memory network for exercising the seeding workflow

#![allow(dead_code)]

use std::{
    collections::HashMap,
    future,
    sync::Mutex,
    time::Duration,
};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use scripts::{
    commands::SeedConfig,
    network::{DeployNetwork, NetworkError},
    types::{CreationParams, PropertyParams, Step, StepCall, StepReceipt},
};

/// The registry address used by every test
pub const REGISTRY: Address = Address::new([0xda; 20]);

/// The deployer address used by every test
pub const DEPLOYER: Address = Address::new([0xad; 20]);

/// The initial supply used by every test
pub const INITIAL_SUPPLY: u64 = 1_000_000;

/// How a step's transaction behaves once submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBehavior {
    /// Confirms successfully
    Confirm,
    /// Confirms with a failed status
    Revert,
    /// Confirms successfully, but without a contract address
    NoContractAddress,
    /// Never confirms
    NeverConfirm,
    /// The node refuses the transaction
    Reject,
    /// The node cannot be reached
    Unreachable,
}

/// A transaction the mock accepted
#[derive(Debug, Clone)]
pub struct Submission {
    pub step: Step,
    pub call: StepCall,
    pub gas_limit: u64,
    pub tx_hash: TxHash,
}

#[derive(Default)]
struct MockState {
    submissions: Vec<Submission>,
    /// The share token created so far: (address, supply, holder)
    token: Option<(Address, U256, Address)>,
    nonce: u8,
}

/// A [`DeployNetwork`] whose behavior is scripted per step
pub struct MockNetwork {
    gas_limit: Option<u64>,
    behaviors: HashMap<Step, StepBehavior>,
    failing_reads: bool,
    stalled_gas_limit: bool,
    stalled_reads: bool,
    state: Mutex<MockState>,
}

impl MockNetwork {
    /// A network with the given block gas limit on which every step confirms
    pub fn new(gas_limit: u64) -> Self {
        Self {
            gas_limit: Some(gas_limit),
            behaviors: HashMap::new(),
            failing_reads: false,
            stalled_gas_limit: false,
            stalled_reads: false,
            state: Mutex::new(MockState::default()),
        }
    }

    /// A network whose latest block cannot be fetched
    pub fn unreachable() -> Self {
        Self {
            gas_limit: None,
            ..Self::new(0)
        }
    }

    pub fn with_step(mut self, step: Step, behavior: StepBehavior) -> Self {
        self.behaviors.insert(step, behavior);
        self
    }

    pub fn with_failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    /// A network that never answers the block gas limit query
    pub fn with_stalled_gas_limit(mut self) -> Self {
        self.stalled_gas_limit = true;
        self
    }

    /// A network that never answers token reads
    pub fn with_stalled_reads(mut self) -> Self {
        self.stalled_reads = true;
        self
    }

    /// Every transaction accepted so far, in submission order
    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// The steps submitted so far, in submission order
    pub fn submitted_steps(&self) -> Vec<Step> {
        self.submissions().iter().map(|s| s.step).collect()
    }

    fn behavior(&self, step: Step) -> StepBehavior {
        self.behaviors.get(&step).copied().unwrap_or(StepBehavior::Confirm)
    }
}

/// The step a call belongs to
pub fn step_of(call: &StepCall) -> Step {
    match call {
        StepCall::Create(CreationParams::Token { .. }) => Step::Token,
        StepCall::Create(CreationParams::Vault { .. }) => Step::Vault,
        StepCall::Create(CreationParams::Distributor { .. }) => Step::Distributor,
        StepCall::Create(CreationParams::Registry) => panic!("the registry is never created"),
        StepCall::Finalize(_) => Step::Finalize,
    }
}

#[async_trait]
impl DeployNetwork for MockNetwork {
    async fn block_gas_limit(&self) -> Result<u64, NetworkError> {
        if self.stalled_gas_limit {
            return future::pending().await;
        }

        self.gas_limit
            .ok_or_else(|| NetworkError::Unavailable("connection refused".to_string()))
    }

    async fn submit(&self, call: &StepCall, gas_limit: u64) -> Result<TxHash, NetworkError> {
        let step = step_of(call);
        match self.behavior(step) {
            StepBehavior::Reject => {
                return Err(NetworkError::Rejected("insufficient funds for gas".to_string()))
            }
            StepBehavior::Unreachable => {
                return Err(NetworkError::Unavailable("connection refused".to_string()))
            }
            _ => {}
        }

        let mut state = self.state.lock().unwrap();
        state.nonce += 1;
        let tx_hash = TxHash::with_last_byte(state.nonce);
        state.submissions.push(Submission {
            step,
            call: call.clone(),
            gas_limit,
            tx_hash,
        });

        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<StepReceipt, NetworkError> {
        let submission = self
            .submissions()
            .into_iter()
            .find(|s| s.tx_hash == tx_hash)
            .ok_or_else(|| NetworkError::Unavailable("unknown transaction".to_string()))?;

        let behavior = self.behavior(submission.step);
        if behavior == StepBehavior::NeverConfirm {
            return future::pending().await;
        }

        // Created contracts live at an address derived from the creating transaction
        let created = Address::with_last_byte(0x10 + tx_hash[31]);
        let (status, contract_address) = match (&submission.call, behavior) {
            (_, StepBehavior::Revert) => (false, None),
            (StepCall::Create(_), StepBehavior::Confirm) => (true, Some(created)),
            _ => (true, None),
        };

        if let (StepCall::Create(CreationParams::Token {
            initial_holder,
            initial_supply,
            ..
        }), Some(address)) = (&submission.call, contract_address)
        {
            self.state.lock().unwrap().token = Some((address, *initial_supply, *initial_holder));
        }

        Ok(StepReceipt {
            tx_hash,
            status,
            gas_used: if status { 1_500_000 } else { submission.gas_limit },
            contract_address,
            block_number: Some(u64::from(tx_hash[31])),
        })
    }

    async fn total_supply(&self, token: Address) -> Result<U256, NetworkError> {
        if self.stalled_reads {
            return future::pending().await;
        }
        if self.failing_reads {
            return Err(NetworkError::Unavailable("execution reverted".to_string()));
        }

        Ok(match self.state.lock().unwrap().token {
            Some((address, supply, _)) if address == token => supply,
            _ => U256::ZERO,
        })
    }

    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, NetworkError> {
        if self.stalled_reads {
            return future::pending().await;
        }
        if self.failing_reads {
            return Err(NetworkError::Unavailable("execution reverted".to_string()));
        }

        Ok(match self.state.lock().unwrap().token {
            Some((address, supply, initial_holder))
                if address == token && initial_holder == holder =>
            {
                supply
            }
            _ => U256::ZERO,
        })
    }
}

/// A seeding configuration with the given reserve fraction and confirmation timeout
pub fn seed_config(reserve_bps: u16, confirmation_timeout: Duration) -> SeedConfig {
    SeedConfig {
        registry: REGISTRY,
        deployer: DEPLOYER,
        property: PropertyParams {
            name: "Amman Residence".to_string(),
            symbol: "AMMN".to_string(),
            initial_supply: U256::from(INITIAL_SUPPLY),
            reserve_bps,
        },
        gas_floor: 8_000_000,
        gas_margin: 1_000_000,
        confirmation_timeout,
    }
}
