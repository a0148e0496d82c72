//! Utilities for the seeding scripts.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes};
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_BYTECODE_KEY, ARTIFACT_EXTENSION, NETWORK_KEY},
    errors::SeedError,
    network::ContractArtifacts,
    types::{ComponentKind, DeploymentRecord},
};

/// The registry deployment recorded by the migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDeployment {
    /// The name of the network the registry was deployed to
    pub network: Option<String>,
    /// The registry's address
    pub address: Address,
}

/// Sets up a signing provider for the given private key and RPC url,
/// returning it alongside the signer's address
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(DynProvider, Address), SeedError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| SeedError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| SeedError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    Ok((DynProvider::new(provider), deployer))
}

/// Read and parse a JSON file
pub fn get_json_from_file(file_path: &Path) -> Result<Value, SeedError> {
    let contents = fs::read_to_string(file_path)
        .map_err(|e| SeedError::ReadDeployments(format!("{}: {}", file_path.display(), e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| SeedError::ReadDeployments(format!("{}: {}", file_path.display(), e)))
}

/// Read the registry address, and the network it lives on, from the
/// deployments file written by the migration
pub fn read_registry_deployment(file_path: &Path) -> Result<RegistryDeployment, SeedError> {
    let parsed_json = get_json_from_file(file_path)?;
    let key = ComponentKind::Registry.contract_name();

    let addr_str = parsed_json
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| SeedError::ReadDeployments(format!("key {key} not found")))?;
    let address = Address::from_str(addr_str)
        .map_err(|e| SeedError::ReadDeployments(format!("invalid {key} address: {e}")))?;

    let network = parsed_json
        .get(NETWORK_KEY)
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(RegistryDeployment { network, address })
}

/// Record the addresses of the seeded components in the deployments file,
/// keeping every key already present
pub fn write_deployed_addresses(
    file_path: &Path,
    records: &[DeploymentRecord],
) -> Result<(), SeedError> {
    let mut parsed_json = if file_path.exists() {
        get_json_from_file(file_path)
            .map_err(|e| SeedError::WriteDeployments(e.to_string()))?
    } else {
        Value::Object(Default::default())
    };

    let object = parsed_json.as_object_mut().ok_or_else(|| {
        SeedError::WriteDeployments("deployments file is not a JSON object".to_string())
    })?;
    for record in records.iter().filter(|r| r.kind != ComponentKind::Registry) {
        object.insert(
            record.kind.contract_name().to_string(),
            Value::String(format!("{:#x}", record.address)),
        );
    }

    let contents = serde_json::to_string_pretty(&parsed_json)
        .map_err(|e| SeedError::WriteDeployments(e.to_string()))?;
    fs::write(file_path, contents).map_err(|e| SeedError::WriteDeployments(e.to_string()))
}

/// The path of a contract's build artifact
pub fn artifact_path(artifacts_dir: &Path, kind: ComponentKind) -> PathBuf {
    artifacts_dir
        .join(kind.contract_name())
        .with_extension(ARTIFACT_EXTENSION)
}

/// Read a contract's creation bytecode from its build artifact
pub fn read_artifact_bytecode(
    artifacts_dir: &Path,
    kind: ComponentKind,
) -> Result<Bytes, SeedError> {
    let path = artifact_path(artifacts_dir, kind);
    let contents = fs::read_to_string(&path)
        .map_err(|e| SeedError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    let artifact: Value = serde_json::from_str(&contents)
        .map_err(|e| SeedError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

    let bytecode = artifact
        .get(ARTIFACT_BYTECODE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SeedError::ArtifactParsing(format!("{} has no bytecode", path.display()))
        })?;
    let bytecode =
        Bytes::from_str(bytecode).map_err(|e| SeedError::ArtifactParsing(e.to_string()))?;

    // Abstract contracts and interfaces compile to empty bytecode
    if bytecode.is_empty() {
        return Err(SeedError::ArtifactParsing(format!(
            "{} has empty bytecode",
            path.display()
        )));
    }

    Ok(bytecode)
}

/// Read the creation bytecode of every component the seeder deploys
pub fn read_contract_artifacts(artifacts_dir: &Path) -> Result<ContractArtifacts, SeedError> {
    Ok(ContractArtifacts {
        token: read_artifact_bytecode(artifacts_dir, ComponentKind::Token)?,
        vault: read_artifact_bytecode(artifacts_dir, ComponentKind::Vault)?,
        distributor: read_artifact_bytecode(artifacts_dir, ComponentKind::Distributor)?,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy_primitives::Address;
    use serde_json::{json, Value};

    use super::{read_artifact_bytecode, read_registry_deployment, write_deployed_addresses};
    use crate::{
        errors::SeedError,
        types::{ComponentKind, CreationParams, DeploymentRecord},
    };

    #[test]
    fn test_read_registry_deployment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(
            &path,
            json!({
                "network": "development",
                "RealEstateDAO": "0x00000000000000000000000000000000000000da",
            })
            .to_string(),
        )
        .unwrap();

        let deployment = read_registry_deployment(&path).unwrap();
        assert_eq!(deployment.network.as_deref(), Some("development"));
        assert_eq!(deployment.address, Address::with_last_byte(0xda));
    }

    #[test]
    fn test_missing_registry_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(&path, json!({ "network": "development" }).to_string()).unwrap();

        assert!(matches!(
            read_registry_deployment(&path),
            Err(SeedError::ReadDeployments(_))
        ));
    }

    #[test]
    fn test_write_keeps_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(
            &path,
            json!({
                "network": "development",
                "RealEstateDAO": "0x00000000000000000000000000000000000000da",
            })
            .to_string(),
        )
        .unwrap();

        let records = [
            DeploymentRecord::registry(Address::with_last_byte(0xda)),
            DeploymentRecord {
                kind: ComponentKind::Vault,
                address: Address::with_last_byte(2),
                params: CreationParams::Vault {
                    registry: Address::with_last_byte(0xda),
                    property_manager: Address::with_last_byte(0xad),
                },
                tx_hash: None,
            },
        ];
        write_deployed_addresses(&path, &records).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["network"], "development");
        assert_eq!(
            written["RealEstateDAO"],
            "0x00000000000000000000000000000000000000da"
        );
        assert_eq!(
            written["PropertyVault"],
            "0x0000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn test_read_artifact_bytecode() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("RentDistributor.json"),
            json!({ "contractName": "RentDistributor", "bytecode": "0x6080604052" }).to_string(),
        )
        .unwrap();
        fs::write(
            dir.path().join("PropertyVault.json"),
            json!({ "contractName": "PropertyVault", "bytecode": "0x" }).to_string(),
        )
        .unwrap();

        let bytecode = read_artifact_bytecode(dir.path(), ComponentKind::Distributor).unwrap();
        assert_eq!(bytecode.to_vec(), vec![0x60, 0x80, 0x60, 0x40, 0x52]);

        assert!(read_artifact_bytecode(dir.path(), ComponentKind::Vault).is_err());
        assert!(read_artifact_bytecode(dir.path(), ComponentKind::Token).is_err());
    }
}
