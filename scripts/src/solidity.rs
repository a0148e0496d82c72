//! Definitions of the Solidity interfaces called during seeding

use alloy::sol;
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{SolCall, SolConstructor};

use crate::{
    errors::SeedError,
    types::{CreationParams, FinalizeLinkage},
};

sol! {
    interface IRealEstateDao {
        function finalizePropertyLite(
            address token,
            address vault,
            address distributor,
            address admin,
            uint256 reserveBps
        ) external;
    }

    #[sol(rpc)]
    interface IFractionToken {
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    contract FractionTokenLite {
        constructor(
            string memory name,
            string memory symbol,
            address admin,
            address initialHolder,
            uint256 initialSupply
        );
    }

    contract PropertyVault {
        constructor(address dao, address propertyManager);
    }

    contract RentDistributor {
        constructor(address token, address vault);
    }
}

/// ABI-encode the constructor arguments for the given component
pub fn constructor_args(params: &CreationParams) -> Result<Vec<u8>, SeedError> {
    let encoded = match params {
        CreationParams::Token {
            name,
            symbol,
            admin,
            initial_holder,
            initial_supply,
        } => FractionTokenLite::constructorCall {
            name: name.clone(),
            symbol: symbol.clone(),
            admin: *admin,
            initialHolder: *initial_holder,
            initialSupply: *initial_supply,
        }
        .abi_encode(),
        CreationParams::Vault {
            registry,
            property_manager,
        } => PropertyVault::constructorCall {
            dao: *registry,
            propertyManager: *property_manager,
        }
        .abi_encode(),
        CreationParams::Distributor { token, vault } => RentDistributor::constructorCall {
            token: *token,
            vault: *vault,
        }
        .abi_encode(),
        CreationParams::Registry => {
            return Err(SeedError::CalldataConstruction(
                "the registry is not deployed by the seeder".to_string(),
            ))
        }
    };

    Ok(encoded)
}

/// Build the creation code for a component: its bytecode followed by its
/// encoded constructor arguments
pub fn creation_code(bytecode: &Bytes, params: &CreationParams) -> Result<Bytes, SeedError> {
    let mut code = bytecode.to_vec();
    code.extend(constructor_args(params)?);
    Ok(code.into())
}

/// Prepare calldata for the registry's `finalizePropertyLite` method
pub fn finalize_calldata(linkage: &FinalizeLinkage) -> Bytes {
    IRealEstateDao::finalizePropertyLiteCall {
        token: linkage.token,
        vault: linkage.vault,
        distributor: linkage.distributor,
        admin: linkage.admin,
        reserveBps: U256::from(linkage.reserve_bps),
    }
    .abi_encode()
    .into()
}
