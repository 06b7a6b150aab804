//! Compilation artifacts written after every successful compilation

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{keccak256, Bytes, B256};
use deploy_config::compiler::CompilerProfile;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{constants::ARTIFACT_EXTENSION, errors::ScriptError, solc::StandardJsonOutput};

/// The compiled form of a single contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// The contract's name
    pub contract_name: String,
    /// The source unit the contract is defined in
    pub source_name: String,
    /// The contract ABI
    pub abi: serde_json::Value,
    /// The `0x`-prefixed creation bytecode
    pub bytecode: String,
    /// The `0x`-prefixed runtime bytecode
    pub deployed_bytecode: String,
    /// The compiler and settings that produced the bytecode
    pub compiler: CompilerProfile,
}

impl Artifact {
    /// Extract a contract's artifact from the compiler output
    pub fn from_output(
        output: &StandardJsonOutput,
        source_name: &str,
        contract_name: &str,
        compiler: &CompilerProfile,
    ) -> Result<Self, ScriptError> {
        let contract = output
            .contracts
            .get(source_name)
            .and_then(|contracts| contracts.get(contract_name))
            .ok_or_else(|| {
                ScriptError::CompilationError(format!(
                    "contract {} not found in {}",
                    contract_name, source_name
                ))
            })?;

        let bytecode = &contract.evm.bytecode;
        if !bytecode.link_references.is_empty() {
            let libraries = bytecode.link_references.keys().join(", ");
            return Err(ScriptError::CompilationError(format!(
                "{} must be linked against libraries in {}",
                contract_name, libraries
            )));
        }
        if bytecode.object.is_empty() {
            return Err(ScriptError::CompilationError(format!(
                "{} has no bytecode, it is abstract or an interface",
                contract_name
            )));
        }

        Ok(Self {
            contract_name: contract_name.to_string(),
            source_name: source_name.to_string(),
            abi: contract.abi.clone(),
            bytecode: with_hex_prefix(&bytecode.object),
            deployed_bytecode: with_hex_prefix(&contract.evm.deployed_bytecode.object),
            compiler: compiler.clone(),
        })
    }

    /// The decoded creation bytecode
    pub fn creation_code(&self) -> Result<Bytes, ScriptError> {
        hex::decode(self.bytecode.trim_start_matches("0x"))
            .map(Bytes::from)
            .map_err(|e| ScriptError::CompilationError(format!("invalid bytecode: {}", e)))
    }

    /// The keccak-256 hash of the creation bytecode
    pub fn bytecode_hash(&self) -> Result<B256, ScriptError> {
        self.creation_code().map(keccak256)
    }

    /// Write the artifact to `<dir>/<ContractName>.json`, returning its path
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ScriptError> {
        fs::create_dir_all(dir).map_err(|e| ScriptError::ArtifactWriting(e.to_string()))?;

        let path = dir.join(&self.contract_name).with_extension(ARTIFACT_EXTENSION);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::ArtifactWriting(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| ScriptError::ArtifactWriting(format!("{}: {}", path.display(), e)))?;

        Ok(path)
    }
}

/// Prefix a hex string with `0x` unless it already is
fn with_hex_prefix(hex: &str) -> String {
    if hex.starts_with("0x") {
        hex.to_string()
    } else {
        format!("0x{hex}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deploy_config::version::SolcVersion;

    /// Compiler output holding a single `DepositSplit` contract
    fn output(bytecode: &str, link_references: &str) -> StandardJsonOutput {
        serde_json::from_str(&format!(
            r#"{{
                "contracts": {{
                    "contracts/DepositSplit.sol": {{
                        "DepositSplit": {{
                            "abi": [{{ "type": "constructor", "inputs": [] }}],
                            "evm": {{
                                "bytecode": {{ "object": "{bytecode}", "linkReferences": {link_references} }},
                                "deployedBytecode": {{ "object": "6080" }}
                            }}
                        }}
                    }}
                }}
            }}"#
        ))
        .unwrap()
    }

    /// The default 0.8.1 profile
    fn profile() -> CompilerProfile {
        CompilerProfile::with_defaults(SolcVersion::new(0, 8, 1), true)
    }

    #[test]
    fn test_extract_artifact() {
        let out = output("6080604052", "{}");
        let artifact =
            Artifact::from_output(&out, "contracts/DepositSplit.sol", "DepositSplit", &profile())
                .unwrap();

        assert_eq!(artifact.bytecode, "0x6080604052");
        assert_eq!(artifact.deployed_bytecode, "0x6080");
        assert_eq!(artifact.creation_code().unwrap().len(), 5);
        assert_eq!(artifact.bytecode_hash().unwrap(), keccak256([0x60u8, 0x80, 0x60, 0x40, 0x52]));
    }

    #[test]
    fn test_missing_contract() {
        let out = output("6080", "{}");
        let err = Artifact::from_output(&out, "contracts/DepositSplit.sol", "Other", &profile())
            .unwrap_err();
        assert!(matches!(err, ScriptError::CompilationError(_)));
    }

    #[test]
    fn test_unlinked_libraries() {
        let out = output(
            "6080__$abc$__",
            r#"{ "contracts/lib/Shares.sol": { "Shares": [{ "start": 2, "length": 20 }] } }"#,
        );
        let err =
            Artifact::from_output(&out, "contracts/DepositSplit.sol", "DepositSplit", &profile())
                .unwrap_err();

        match err {
            ScriptError::CompilationError(msg) => assert!(msg.contains("contracts/lib/Shares.sol")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_abstract_contract() {
        let out = output("", "{}");
        let err =
            Artifact::from_output(&out, "contracts/DepositSplit.sol", "DepositSplit", &profile())
                .unwrap_err();
        assert!(matches!(err, ScriptError::CompilationError(_)));
    }

    #[test]
    fn test_write_artifact() {
        let dir = std::env::temp_dir().join(format!("artifacts-{}", rand::random::<u64>()));
        let out = output("6080604052", "{}");
        let artifact =
            Artifact::from_output(&out, "contracts/DepositSplit.sol", "DepositSplit", &profile())
                .unwrap();

        let path = artifact.write(&dir).unwrap();
        assert_eq!(path, dir.join("DepositSplit.json"));

        let written: Artifact =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, artifact);

        fs::remove_dir_all(dir).unwrap();
    }
}
