//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy_primitives::{Address, TxHash, U256};
use serde::Serialize;

use crate::errors::SeedError;

/// The steps of the seeding sequence, in the order in which they must run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Create the fractional share token
    Token,
    /// Create the property vault
    Vault,
    /// Create the rent distributor
    Distributor,
    /// Link the created components through the registry
    Finalize,
}

impl Step {
    /// Every step, in execution order
    pub const SEQUENCE: [Step; 4] = [Step::Token, Step::Vault, Step::Distributor, Step::Finalize];

    /// The component created by this step, `None` for the finalize step
    pub fn component(self) -> Option<ComponentKind> {
        match self {
            Step::Token => Some(ComponentKind::Token),
            Step::Vault => Some(ComponentKind::Vault),
            Step::Distributor => Some(ComponentKind::Distributor),
            Step::Finalize => None,
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Token => write!(f, "token"),
            Step::Vault => write!(f, "vault"),
            Step::Distributor => write!(f, "distributor"),
            Step::Finalize => write!(f, "finalize"),
        }
    }
}

/// The kinds of on-chain components involved in seeding a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// The fractional share token
    Token,
    /// The property vault
    Vault,
    /// The rent distributor
    Distributor,
    /// The registry (DAO) contract, deployed ahead of time by the migration
    Registry,
}

impl ComponentKind {
    /// The name of the contract backing this component, as used for
    /// build artifacts and deployments file keys
    pub fn contract_name(self) -> &'static str {
        match self {
            ComponentKind::Token => "FractionTokenLite",
            ComponentKind::Vault => "PropertyVault",
            ComponentKind::Distributor => "RentDistributor",
            ComponentKind::Registry => "RealEstateDAO",
        }
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Token => write!(f, "token"),
            ComponentKind::Vault => write!(f, "vault"),
            ComponentKind::Distributor => write!(f, "distributor"),
            ComponentKind::Registry => write!(f, "registry"),
        }
    }
}

/// The parameters describing the property being seeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyParams {
    /// The share token name
    pub name: String,
    /// The share token symbol
    pub symbol: String,
    /// The number of shares minted to the initial holder
    pub initial_supply: U256,
    /// The fraction of rent held in reserve, in basis points
    pub reserve_bps: u16,
}

/// The constructor arguments a component was created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationParams {
    /// `FractionTokenLite(name, symbol, admin, initialHolder, initialSupply)`
    Token {
        /// The share token name
        name: String,
        /// The share token symbol
        symbol: String,
        /// The token administrator, always the registry
        admin: Address,
        /// The account the initial supply is minted to
        initial_holder: Address,
        /// The number of shares minted at creation
        initial_supply: U256,
    },
    /// `PropertyVault(dao, propertyManager)`
    Vault {
        /// The registry the vault answers to
        registry: Address,
        /// The property manager allowed to move funds into the vault
        property_manager: Address,
    },
    /// `RentDistributor(token, vault)`
    Distributor {
        /// The share token rent is distributed over
        token: Address,
        /// The vault rent is paid out of
        vault: Address,
    },
    /// The registry is created by the migration, not by the seeder
    Registry,
}

impl CreationParams {
    /// The kind of component these parameters create
    pub fn kind(&self) -> ComponentKind {
        match self {
            CreationParams::Token { .. } => ComponentKind::Token,
            CreationParams::Vault { .. } => ComponentKind::Vault,
            CreationParams::Distributor { .. } => ComponentKind::Distributor,
            CreationParams::Registry => ComponentKind::Registry,
        }
    }
}

/// A component that exists on-chain as of this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRecord {
    /// The kind of component
    pub kind: ComponentKind,
    /// The address the component lives at
    pub address: Address,
    /// The arguments the component was created with
    pub params: CreationParams,
    /// The creation transaction, absent for components deployed outside this run
    pub tx_hash: Option<TxHash>,
}

impl DeploymentRecord {
    /// A record for the externally deployed registry
    pub fn registry(address: Address) -> Self {
        Self {
            kind: ComponentKind::Registry,
            address,
            params: CreationParams::Registry,
            tx_hash: None,
        }
    }
}

/// Look up the address of the given component among the records gathered so far
pub fn record_address(
    records: &[DeploymentRecord],
    kind: ComponentKind,
) -> Result<Address, SeedError> {
    records
        .iter()
        .find(|record| record.kind == kind)
        .map(|record| record.address)
        .ok_or_else(|| SeedError::CalldataConstruction(format!("no {kind} address available")))
}

/// The arguments of the registry's `finalizePropertyLite` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeLinkage {
    /// The registry the call is sent to
    pub registry: Address,
    /// The share token created in this run
    pub token: Address,
    /// The vault created in this run
    pub vault: Address,
    /// The distributor created in this run
    pub distributor: Address,
    /// The account granted the registry's admin role
    pub admin: Address,
    /// The reserve fraction, in basis points
    pub reserve_bps: u16,
}

/// A single transaction the sequencer asks the network to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCall {
    /// Create a new component
    Create(CreationParams),
    /// Link the components through the registry
    Finalize(FinalizeLinkage),
}

/// The confirmed result of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReceipt {
    /// The transaction hash
    pub tx_hash: TxHash,
    /// Whether execution succeeded
    pub status: bool,
    /// The gas consumed by the transaction
    pub gas_used: u64,
    /// The address of the created contract, if the transaction created one
    pub contract_address: Option<Address>,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
}

/// Post-deployment state read back from the share token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// The token's total supply
    pub total_supply: U256,
    /// The administrator's share balance
    pub admin_balance: U256,
}

/// The result of a seeding run in which every step confirmed successfully
#[derive(Debug)]
pub struct SeedOutcome {
    /// The per-transaction gas budget the run used
    pub budget: u64,
    /// The registry followed by the token, vault, and distributor records
    pub records: Vec<DeploymentRecord>,
    /// The finalize transaction's receipt
    pub finalize_receipt: StepReceipt,
    /// The verifier's read-back, reported separately from deployment success
    pub verification: Result<Verification, SeedError>,
    /// Whether the read-back matched the initial supply, absent if the reads
    /// failed
    pub supply_matches: Option<bool>,
    /// The result of writing the seeded addresses back to the deployments
    /// file, absent if no write was attempted
    pub recording: Option<Result<(), SeedError>>,
}

impl SeedOutcome {
    /// The address of the given component
    pub fn address_of(&self, kind: ComponentKind) -> Option<Address> {
        record_address(&self.records, kind).ok()
    }

    /// Errors raised after every transaction confirmed, in the order they
    /// occurred
    pub fn follow_up_errors(&self) -> Vec<&SeedError> {
        let recording = self.recording.as_ref().and_then(|res| res.as_ref().err());
        self.verification.as_ref().err().into_iter().chain(recording).collect()
    }
}
