//! Implementations of the script's commands

use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{utils::format_ether, Address, Bytes, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};
use deploy_config::compiler::CompilerProfile;
use tracing::info;

use crate::{
    artifacts::Artifact,
    cli::{CompileArgs, DeployArgs},
    constants::SOLIDITY_EXTENSION,
    errors::ScriptError,
    solc::{Solc, StandardJsonInput},
    sources::SourceGraph,
    types::{DeploymentResult, ScriptContext},
    utils::{
        check_receipt_status, classify_pending_error, classify_rpc_error, setup_client, Client,
    },
};

/// Deploy a single contract with no constructor arguments
pub async fn deploy(
    args: DeployArgs,
    ctx: &ScriptContext,
) -> Result<DeploymentResult, ScriptError> {
    let network = ctx.config.network(&ctx.network)?;
    let priv_key = ctx
        .priv_key
        .as_deref()
        .or(network.signing_key())
        .ok_or_else(|| ScriptError::NoSignerAvailable(network.name.clone()))?;
    let (client, deployer) = setup_client(priv_key, &network.rpc_url)?;

    println!("Deploying contracts with the account: {}", deployer);

    let balance = fetch_balance(&client, deployer).await?;
    info!(network = %network.name, "deployer holds {} ETH", format_ether(balance));
    println!("Account balance: {}", balance);

    let artifact = build_contract(&args.contract, ctx)?;
    let contract_address = deploy_contract(&client, deployer, artifact.creation_code()?).await?;

    println!("{} address: {}", args.contract, contract_address);

    Ok(DeploymentResult {
        contract_address,
        deployer_address: deployer,
        deployer_balance_at_start: balance,
    })
}

/// Compile a contract, write its artifact and print its bytecode hash
pub fn compile(args: CompileArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let artifact = build_contract(&args.contract, ctx)?;

    println!(
        "Compiled {} with solc {} (optimizer {})",
        artifact.contract_name,
        artifact.compiler.version,
        if artifact.compiler.settings.optimizer.enabled { "enabled" } else { "disabled" },
    );
    println!("Bytecode hash: {}", artifact.bytecode_hash()?);

    Ok(())
}

/// Compile the sources reachable from `<contracts-dir>/<contract>.sol` and
/// write the contract's artifact
pub fn build_contract(contract: &str, ctx: &ScriptContext) -> Result<Artifact, ScriptError> {
    let entry = entry_unit_name(contract, ctx)?;
    let graph = SourceGraph::resolve(&ctx.root, &entry)?;

    let profile = ctx.config.solidity.select(&graph.pragmas())?;
    info!(
        solc = %profile.version,
        optimizer = profile.settings.optimizer.enabled,
        runs = profile.settings.optimizer.runs,
        "selected compiler for {}",
        graph.entry()
    );

    let solc = Solc::find(profile.version, ctx.solc.as_deref())?;
    let output = solc.compile(&StandardJsonInput::new(&graph, &profile.settings))?;

    let compiler = CompilerProfile {
        version: solc.version,
        settings: profile.settings,
    };
    let artifact = Artifact::from_output(&output, graph.entry(), contract, &compiler)?;
    let path = artifact.write(&ctx.root.join(&ctx.artifacts_dir))?;
    info!("wrote artifact {}", path.display());

    Ok(artifact)
}

/// The source unit name of a contract's entry file, relative to the project
/// root
///
/// An absolute contracts directory must lie inside the root.
pub fn entry_unit_name(contract: &str, ctx: &ScriptContext) -> Result<String, ScriptError> {
    let entry = ctx
        .contracts_dir
        .join(contract)
        .with_extension(SOLIDITY_EXTENSION);
    if entry.is_relative() {
        return Ok(entry.to_string_lossy().into_owned());
    }

    let relative = entry.strip_prefix(&ctx.root).map_err(|_| {
        ScriptError::CompilationError(format!(
            "{} is outside the project root {}",
            entry.display(),
            ctx.root.display()
        ))
    })?;
    Ok(relative.to_string_lossy().into_owned())
}

/// Fetch the balance of an account, in wei
pub async fn fetch_balance(client: &Client, address: Address) -> Result<U256, ScriptError> {
    client
        .get_balance(address)
        .await
        .map_err(classify_rpc_error)
}

/// Submit a contract-creation transaction and wait for it to be mined,
/// returning the address of the new contract
pub async fn deploy_contract(
    client: &Client,
    deployer: Address,
    creation_code: Bytes,
) -> Result<Address, ScriptError> {
    let tx = TransactionRequest::default()
        .with_from(deployer)
        .with_deploy_code(creation_code);

    let gas_limit = client
        .estimate_gas(tx.clone())
        .await
        .map_err(classify_rpc_error)?;
    let tx = tx.with_gas_limit(gas_limit);

    let pending = client
        .send_transaction(tx)
        .await
        .map_err(classify_rpc_error)?;
    let tx_hash = *pending.tx_hash();
    info!(%tx_hash, gas_limit, "deployment submitted");

    let receipt = pending.get_receipt().await.map_err(classify_pending_error)?;
    check_receipt_status(
        receipt.status(),
        receipt.gas_used,
        gas_limit,
        &tx_hash.to_string(),
    )?;

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!("receipt of {} has no contract address", tx_hash))
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, path::PathBuf};

    use alloy::{
        primitives::{B256, U64},
        providers::{DynProvider, ProviderBuilder},
        transports::mock::Asserter,
    };
    use serde_json::json;
    use deploy_config::{network::NetworkConfig, secrets::SecretStore, DeployConfig};

    use super::*;

    /// The first default account of a local development node
    const DEV_PKEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// A client answering from the asserter's queued responses
    ///
    /// Fillers are disabled so that each call maps to exactly one queued response.
    fn mocked_client(asserter: &Asserter) -> Client {
        DynProvider::new(
            ProviderBuilder::new()
                .disable_recommended_fillers()
                .connect_mocked_client(asserter.clone()),
        )
    }

    /// A mined deployment receipt
    fn mined_receipt(
        tx_hash: B256,
        success: bool,
        gas_used: u64,
        contract: Option<Address>,
    ) -> serde_json::Value {
        let status = if success { "0x1" } else { "0x0" };
        let gas_used = format!("{gas_used:#x}");
        let logs_bloom = format!("0x{}", "0".repeat(512));

        json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": gas_used,
            "logs": [],
            "logsBloom": logs_bloom,
            "transactionHash": tx_hash,
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0xbb),
            "blockNumber": "0x1",
            "gasUsed": gas_used,
            "effectiveGasPrice": "0x3b9aca00",
            "from": Address::ZERO,
            "to": null,
            "contractAddress": contract,
        })
    }

    /// Queue the node's answers to one deployment: the gas estimate, the
    /// transaction hash and the receipt, which is fetched once when the
    /// transaction is registered and once when it is confirmed
    fn queue_deployment(
        asserter: &Asserter,
        gas: u64,
        tx_hash: B256,
        receipt: serde_json::Value,
    ) {
        asserter.push_success(&U64::from(gas));
        asserter.push_success(&tx_hash);
        asserter.push_success(&receipt);
        asserter.push_success(&receipt);
    }

    /// A context for the given network rooted at `root`
    fn context(config: DeployConfig, network: &str, root: PathBuf) -> ScriptContext {
        ScriptContext {
            config,
            network: network.to_string(),
            priv_key: None,
            root,
            contracts_dir: PathBuf::from("contracts"),
            artifacts_dir: PathBuf::from("artifacts"),
            solc: None,
        }
    }

    /// Arguments deploying the default contract
    fn deploy_args() -> DeployArgs {
        DeployArgs { contract: "DepositSplit".to_string() }
    }

    #[tokio::test]
    async fn test_fetch_balance() {
        let asserter = Asserter::new();
        asserter.push_success(&U256::from(1_500_000_000_000_000_000u128));

        let balance = fetch_balance(&mocked_client(&asserter), Address::ZERO).await.unwrap();
        assert_eq!(balance, U256::from(1_500_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_fetch_balance_node_error() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("invalid argument 0: hex string has length 38, want 40");

        let err = fetch_balance(&mocked_client(&asserter), Address::ZERO).await.unwrap_err();
        assert!(!matches!(err, ScriptError::RpcUnavailable(_)));
        assert!(matches!(err, ScriptError::ContractDeployment(_)));
    }

    #[tokio::test]
    async fn test_deploy_contract() {
        let asserter = Asserter::new();
        let code = Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52]);
        let (first, second) = (Address::repeat_byte(0x11), Address::repeat_byte(0xab));

        let tx_hash = B256::repeat_byte(0x01);
        let receipt = mined_receipt(tx_hash, true, 150_000, Some(first));
        queue_deployment(&asserter, 200_000, tx_hash, receipt);
        let tx_hash = B256::repeat_byte(0x02);
        let receipt = mined_receipt(tx_hash, true, 150_000, Some(second));
        queue_deployment(&asserter, 200_000, tx_hash, receipt);

        let client = mocked_client(&asserter);
        let deployed = deploy_contract(&client, Address::ZERO, code.clone()).await.unwrap();
        assert_eq!(deployed, first);
        assert_eq!(format!("{deployed}"), deployed.to_checksum(None));

        // Every deployment creates a fresh contract
        let redeployed = deploy_contract(&client, Address::ZERO, code).await.unwrap();
        assert_eq!(redeployed, second);
        assert_ne!(deployed, redeployed);
    }

    #[tokio::test]
    async fn test_deploy_mined_out_of_gas() {
        let asserter = Asserter::new();
        let tx_hash = B256::repeat_byte(0x03);
        let receipt = mined_receipt(tx_hash, false, 200_000, None);
        queue_deployment(&asserter, 200_000, tx_hash, receipt);

        let client = mocked_client(&asserter);
        let err = deploy_contract(&client, Address::ZERO, Bytes::from_static(&[0x60]))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::OutOfGas(_)));
    }

    #[tokio::test]
    async fn test_deploy_mined_revert() {
        let asserter = Asserter::new();
        let tx_hash = B256::repeat_byte(0x04);
        let receipt = mined_receipt(tx_hash, false, 90_000, None);
        queue_deployment(&asserter, 200_000, tx_hash, receipt);

        let client = mocked_client(&asserter);
        let err = deploy_contract(&client, Address::ZERO, Bytes::from_static(&[0x60]))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::TransactionReverted(_)));
    }

    #[test]
    fn test_entry_unit_name() {
        let root = std::env::temp_dir().join("project");
        let mut ctx = context(
            DeployConfig::from_secrets(&SecretStore::default(), true),
            "localhost",
            root.clone(),
        );
        assert_eq!(entry_unit_name("DepositSplit", &ctx).unwrap(), "contracts/DepositSplit.sol");

        ctx.contracts_dir = root.join("src/contracts");
        assert_eq!(
            entry_unit_name("DepositSplit", &ctx).unwrap(),
            "src/contracts/DepositSplit.sol"
        );

        ctx.contracts_dir = std::env::temp_dir().join("elsewhere/contracts");
        let err = entry_unit_name("DepositSplit", &ctx).unwrap_err();
        assert!(matches!(err, ScriptError::CompilationError(_)));
    }

    #[tokio::test]
    async fn test_deploy_unfunded_signer() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("insufficient funds for gas * price + value");

        let client = mocked_client(&asserter);
        let err = deploy_contract(&client, Address::ZERO, Bytes::from_static(&[0x60]))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::InsufficientFunds(_)));
    }

    #[tokio::test]
    async fn test_deploy_reverting_constructor() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("execution reverted");

        let client = mocked_client(&asserter);
        let err = deploy_contract(&client, Address::ZERO, Bytes::from_static(&[0x60]))
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::TransactionReverted(_)));
    }

    #[tokio::test]
    async fn test_no_signer_available() {
        let config = DeployConfig::from_secrets(&SecretStore::default(), true);
        let ctx = context(config, "localhost", std::env::temp_dir());

        let err = deploy(deploy_args(), &ctx).await.unwrap_err();
        assert!(matches!(err, ScriptError::NoSignerAvailable(name) if name == "localhost"));
    }

    #[tokio::test]
    async fn test_unreachable_network() {
        let mut config = DeployConfig::from_secrets(&SecretStore::default(), true);
        config.networks = BTreeMap::from([(
            "offline".to_string(),
            NetworkConfig {
                url: Some("http://127.0.0.1:1".to_string()),
                accounts: vec![DEV_PKEY.to_string()],
            },
        )]);
        let ctx = context(config, "offline", std::env::temp_dir());

        let err = deploy(deploy_args(), &ctx).await.unwrap_err();
        assert!(matches!(err, ScriptError::RpcUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unknown_network() {
        let config = DeployConfig::from_secrets(&SecretStore::default(), true);
        let ctx = context(config, "polygon", std::env::temp_dir());

        let err = deploy(deploy_args(), &ctx).await.unwrap_err();
        assert!(matches!(err, ScriptError::Config(_)));
    }

    /// A stand-in for `solc` whose bytecode depends on the optimizer setting
    #[cfg(unix)]
    const FAKE_SOLC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "solc, the solidity compiler commandline interface"
    echo "Version: 0.8.1+commit.df193b15.Linux.g++"
    exit 0
fi
input=$(cat)
case "$input" in
    *'"enabled":true'*) object=6080604052600a ;;
    *) object=6080604052600b ;;
esac
printf '{"contracts":{"contracts/DepositSplit.sol":{"DepositSplit":{"abi":[],"evm":{"bytecode":{"object":"%s","linkReferences":{}},"deployedBytecode":{"object":"%s"}}}}}}' "$object" "$object"
"#;

    #[cfg(unix)]
    #[test]
    fn test_optimizer_changes_bytecode() {
        use std::os::unix::fs::PermissionsExt;

        let root = std::env::temp_dir().join(format!("compile-{}", rand::random::<u64>()));
        fs::create_dir_all(root.join("contracts")).unwrap();
        fs::write(
            root.join("contracts/DepositSplit.sol"),
            "pragma solidity ^0.8.0;\ncontract DepositSplit {}\n",
        )
        .unwrap();

        let solc = root.join("solc");
        fs::write(&solc, FAKE_SOLC).unwrap();
        fs::set_permissions(&solc, fs::Permissions::from_mode(0o755)).unwrap();

        let hash_with = |optimizer: bool| {
            let config = DeployConfig::from_secrets(&SecretStore::default(), optimizer);
            let mut ctx = context(config, "localhost", root.clone());
            ctx.solc = Some(solc.clone());

            let artifact = build_contract("DepositSplit", &ctx).unwrap();
            assert_eq!(artifact.compiler.settings.optimizer.enabled, optimizer);
            artifact.bytecode_hash().unwrap()
        };

        assert_ne!(hash_with(true), hash_with(false));
        assert!(root.join("artifacts/DepositSplit.json").is_file());

        fs::remove_dir_all(root).unwrap();
    }
}
