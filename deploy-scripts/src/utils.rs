//! Utilities for the deploy script.

use std::{path::Path, str::FromStr};

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::Address,
    providers::{DynProvider, PendingTransactionError, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, RpcError, TransportErrorKind},
};
use deploy_config::{optimizer_enabled_from_env, secrets::SecretStore, DeployConfig};
use tracing::info;

use crate::{
    constants::{INSUFFICIENT_FUNDS_MESSAGES, OUT_OF_GAS_MESSAGES, REVERT_MESSAGE},
    errors::ScriptError,
};

/// The provider type used to talk to the selected network
pub type Client = DynProvider<Ethereum>;

/// Load the deployment configuration
///
/// An explicit configuration file takes precedence; otherwise the project
/// defaults are built around the secret store.
pub fn load_config(
    secrets_path: &Path,
    config_path: Option<&Path>,
) -> Result<DeployConfig, ScriptError> {
    if let Some(path) = config_path {
        info!("loading config from {}", path.display());
        return Ok(DeployConfig::from_file(path)?);
    }

    let secrets = SecretStore::from_file(secrets_path)?;
    Ok(DeployConfig::from_secrets(&secrets, optimizer_enabled_from_env()))
}

/// Sets up a signing client for the given network, returning it along with
/// the address of the signer
pub fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(Client, Address), ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let address = signer.address();

    let url =
        Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url);

    Ok((DynProvider::new(provider), address))
}

/// Map an RPC failure during deployment onto the script's error taxonomy
pub fn classify_rpc_error(err: RpcError<TransportErrorKind>) -> ScriptError {
    match &err {
        RpcError::Transport(kind) => ScriptError::RpcUnavailable(kind.to_string()),
        RpcError::ErrorResp(payload) => classify_node_message(&payload.message),
        _ => ScriptError::ContractDeployment(err.to_string()),
    }
}

/// Map a failure waiting on a pending transaction onto the script's error taxonomy
pub fn classify_pending_error(err: PendingTransactionError) -> ScriptError {
    match err {
        PendingTransactionError::TransportError(e) => classify_rpc_error(e),
        other => ScriptError::ContractDeployment(other.to_string()),
    }
}

/// Classify a node's error message
pub fn classify_node_message(message: &str) -> ScriptError {
    let lower = message.to_lowercase();
    let msg = message.to_string();

    if INSUFFICIENT_FUNDS_MESSAGES.iter().any(|m| lower.contains(m)) {
        ScriptError::InsufficientFunds(msg)
    } else if OUT_OF_GAS_MESSAGES.iter().any(|m| lower.contains(m)) {
        ScriptError::OutOfGas(msg)
    } else if lower.contains(REVERT_MESSAGE) {
        ScriptError::TransactionReverted(msg)
    } else {
        ScriptError::ContractDeployment(msg)
    }
}

/// Check the outcome of a mined deployment transaction
///
/// A failed deployment that consumed its whole gas limit ran out of gas.
pub fn check_receipt_status(
    success: bool,
    gas_used: u64,
    gas_limit: u64,
    tx_hash: &str,
) -> Result<(), ScriptError> {
    match (success, gas_used >= gas_limit) {
        (true, _) => Ok(()),
        (false, true) => Err(ScriptError::OutOfGas(format!(
            "transaction {} used all {} gas",
            tx_hash, gas_limit
        ))),
        (false, false) => Err(ScriptError::TransactionReverted(format!(
            "transaction {} failed after using {} of {} gas",
            tx_hash, gas_used, gas_limit
        ))),
    }
}
