//! The network surface the seeding workflow depends on, and its alloy-backed
//! implementation

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    time::Duration,
};

use alloy::{
    eips::BlockNumberOrTag,
    network::TransactionBuilder,
    providers::{DynProvider, Provider},
    rpc::types::{BlockTransactionsKind, TransactionReceipt, TransactionRequest},
    transports::{RpcError, TransportError},
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    solidity::{creation_code, finalize_calldata, IFractionToken},
    types::{ComponentKind, StepCall, StepReceipt},
};

/// Errors surfaced by a [`DeployNetwork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The node could not be reached, or did not answer
    Unavailable(String),
    /// The node refused the request, e.g. rejecting a transaction before
    /// it entered the mempool
    Rejected(String),
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Unavailable(s) => write!(f, "network unavailable: {}", s),
            NetworkError::Rejected(s) => write!(f, "request rejected: {}", s),
        }
    }
}

impl Error for NetworkError {}

impl From<TransportError> for NetworkError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => NetworkError::Rejected(payload.to_string()),
            err => NetworkError::Unavailable(err.to_string()),
        }
    }
}

/// The operations the seeding workflow needs from a live network
#[async_trait]
pub trait DeployNetwork: Send + Sync {
    /// The gas limit of the latest block
    async fn block_gas_limit(&self) -> Result<u64, NetworkError>;

    /// Submit the transaction for a step with the given gas limit, returning
    /// as soon as the node has accepted it
    async fn submit(&self, call: &StepCall, gas_limit: u64) -> Result<TxHash, NetworkError>;

    /// Block until the given transaction has a receipt
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<StepReceipt, NetworkError>;

    /// The total supply of the given share token
    async fn total_supply(&self, token: Address) -> Result<U256, NetworkError>;

    /// The share balance of `holder` in the given token
    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, NetworkError>;
}

/// The creation bytecode of each component the seeder deploys
#[derive(Debug, Clone)]
pub struct ContractArtifacts {
    /// `FractionTokenLite` creation bytecode
    pub token: Bytes,
    /// `PropertyVault` creation bytecode
    pub vault: Bytes,
    /// `RentDistributor` creation bytecode
    pub distributor: Bytes,
}

impl ContractArtifacts {
    /// The bytecode for the given component, if the seeder deploys it
    pub fn bytecode(&self, kind: ComponentKind) -> Option<&Bytes> {
        match kind {
            ComponentKind::Token => Some(&self.token),
            ComponentKind::Vault => Some(&self.vault),
            ComponentKind::Distributor => Some(&self.distributor),
            ComponentKind::Registry => None,
        }
    }
}

/// A [`DeployNetwork`] backed by an alloy provider with a signing wallet attached
pub struct AlloyNetwork {
    /// The signing provider
    provider: DynProvider,
    /// The bytecode of the components to deploy
    artifacts: ContractArtifacts,
    /// How long to sleep between receipt lookups
    poll_interval: Duration,
}

impl AlloyNetwork {
    /// Constructor
    pub fn new(
        provider: DynProvider,
        artifacts: ContractArtifacts,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            artifacts,
            poll_interval,
        }
    }
}

/// Build the transaction request for a step
fn build_request(
    artifacts: &ContractArtifacts,
    call: &StepCall,
) -> Result<TransactionRequest, NetworkError> {
    match call {
        StepCall::Create(params) => {
            let kind = params.kind();
            let bytecode = artifacts.bytecode(kind).ok_or_else(|| {
                NetworkError::Rejected(format!("no bytecode available for {kind}"))
            })?;
            let code = creation_code(bytecode, params)
                .map_err(|e| NetworkError::Rejected(e.to_string()))?;

            Ok(TransactionRequest::default().with_deploy_code(code))
        }
        StepCall::Finalize(linkage) => Ok(TransactionRequest::default()
            .with_to(linkage.registry)
            .with_input(finalize_calldata(linkage))),
    }
}

#[async_trait]
impl DeployNetwork for AlloyNetwork {
    async fn block_gas_limit(&self) -> Result<u64, NetworkError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
            .await?
            .ok_or_else(|| NetworkError::Unavailable("latest block not found".to_string()))?;

        Ok(block.header.gas_limit)
    }

    async fn submit(&self, call: &StepCall, gas_limit: u64) -> Result<TxHash, NetworkError> {
        let tx = build_request(&self.artifacts, call)?.with_gas_limit(gas_limit);
        let pending_tx = self.provider.send_transaction(tx).await?;

        Ok(*pending_tx.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<StepReceipt, NetworkError> {
        // Poll for the receipt directly rather than watching the pending transaction,
        // the sequencer bounds the total wait
        loop {
            match self.provider.get_transaction_receipt(tx_hash).await? {
                Some(receipt) => return Ok(step_receipt(&receipt)),
                None => {
                    debug!(%tx_hash, "receipt not yet available");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    async fn total_supply(&self, token: Address) -> Result<U256, NetworkError> {
        let token = IFractionToken::new(token, &self.provider);
        let supply = token
            .totalSupply()
            .call()
            .await
            .map_err(|e| NetworkError::Unavailable(e.to_string()))?
            ._0;

        Ok(supply)
    }

    async fn balance_of(&self, token: Address, holder: Address) -> Result<U256, NetworkError> {
        let token = IFractionToken::new(token, &self.provider);
        let balance = token
            .balanceOf(holder)
            .call()
            .await
            .map_err(|e| NetworkError::Unavailable(e.to_string()))?
            ._0;

        Ok(balance)
    }
}

/// Convert an RPC receipt into the fields the sequencer inspects
fn step_receipt(receipt: &TransactionReceipt) -> StepReceipt {
    StepReceipt {
        tx_hash: receipt.transaction_hash,
        status: receipt.status(),
        gas_used: receipt.gas_used,
        contract_address: receipt.contract_address,
        block_number: receipt.block_number,
    }
}


#[cfg(test)]
mod tests {
    use alloy::{
        rpc::{json_rpc::ErrorPayload, types::TransactionReceipt},
        transports::{RpcError, TransportErrorKind},
    };
    use alloy_primitives::{Address, Bytes, TxHash, TxKind};

    use super::{build_request, step_receipt, ContractArtifacts, NetworkError};
    use crate::{
        solidity::{creation_code, finalize_calldata},
        types::{CreationParams, FinalizeLinkage, StepCall},
    };

    fn artifacts() -> ContractArtifacts {
        ContractArtifacts {
            token: Bytes::from(vec![0x60, 0x01]),
            vault: Bytes::from(vec![0x60, 0x02]),
            distributor: Bytes::from(vec![0x60, 0x03]),
        }
    }

    #[test]
    fn test_node_error_response_is_rejection() {
        let err = RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
            data: None,
        });

        assert!(matches!(NetworkError::from(err), NetworkError::Rejected(_)));
    }

    #[test]
    fn test_transport_failure_is_unavailable() {
        let err = TransportErrorKind::custom_str("connection refused");
        assert!(matches!(NetworkError::from(err), NetworkError::Unavailable(_)));
    }

    #[test]
    fn test_finalize_request_targets_registry() {
        let linkage = FinalizeLinkage {
            registry: Address::with_last_byte(0xda),
            token: Address::with_last_byte(1),
            vault: Address::with_last_byte(2),
            distributor: Address::with_last_byte(3),
            admin: Address::with_last_byte(4),
            reserve_bps: 500,
        };

        let tx = build_request(&artifacts(), &StepCall::Finalize(linkage)).unwrap();
        assert_eq!(tx.to, Some(TxKind::Call(linkage.registry)));
        assert_eq!(tx.input.input(), Some(&finalize_calldata(&linkage)));
    }

    #[test]
    fn test_create_request_deploys_artifact() {
        let params = CreationParams::Distributor {
            token: Address::with_last_byte(1),
            vault: Address::with_last_byte(2),
        };

        let tx = build_request(&artifacts(), &StepCall::Create(params.clone())).unwrap();
        let expected = creation_code(&artifacts().distributor, &params).unwrap();
        assert_eq!(tx.to, Some(TxKind::Create));
        assert_eq!(tx.input.input(), Some(&expected));
    }

    #[test]
    fn test_registry_is_never_deployed() {
        let res = build_request(&artifacts(), &StepCall::Create(CreationParams::Registry));
        assert!(matches!(res, Err(NetworkError::Rejected(_))));
    }

    #[test]
    fn test_step_receipt_from_rpc() {
        let tx_hash = TxHash::with_last_byte(7);
        let created = Address::with_last_byte(0x17);
        let receipt: TransactionReceipt = serde_json::from_value(serde_json::json!({
            "type": "0x2",
            "status": "0x1",
            "cumulativeGasUsed": "0xa028",
            "logs": [],
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "transactionHash": tx_hash,
            "transactionIndex": "0x0",
            "blockHash": TxHash::with_last_byte(0xbb),
            "blockNumber": "0xc",
            "gasUsed": "0xa028",
            "effectiveGasPrice": "0x3b9aca00",
            "from": Address::with_last_byte(0xad),
            "to": null,
            "contractAddress": created,
        }))
        .unwrap();

        let step_receipt = step_receipt(&receipt);
        assert_eq!(step_receipt.tx_hash, tx_hash);
        assert!(step_receipt.status);
        assert_eq!(step_receipt.gas_used, 0xa028);
        assert_eq!(step_receipt.contract_address, Some(created));
        assert_eq!(step_receipt.block_number, Some(12));
    }
}
