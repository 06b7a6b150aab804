//! Compiler and network configuration for deploying the project's contracts.
//!
//! The configuration is assembled once at startup, either from the local
//! secret store with the project defaults or from a JSON file of the same
//! shape, and is immutable afterwards.

pub mod compiler;
pub mod constants;
pub mod errors;
pub mod network;
pub mod secrets;
pub mod version;

use std::{collections::BTreeMap, env, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    compiler::SolidityConfig,
    constants::{
        BSC_NETWORK, BSC_TESTNET_NETWORK, ETH_NETWORK, LOCALHOST_NETWORK, LOCALHOST_RPC_URL,
        OPTIMIZER_DISABLED_ENV_VAR,
    },
    errors::ConfigError,
    network::{NetworkConfig, NetworkProfile},
    secrets::SecretStore,
};

/// Block explorer settings used for contract verification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanConfig {
    /// The block explorer API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// The full deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// The available compilers
    pub solidity: SolidityConfig,
    /// The known networks, by name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Block explorer settings
    #[serde(default)]
    pub etherscan: EtherscanConfig,
}

impl DeployConfig {
    /// Build the project's default configuration around the given secrets
    pub fn from_secrets(secrets: &SecretStore, optimizer_enabled: bool) -> Self {
        let accounts: Vec<String> = secrets.key.iter().cloned().collect();
        let remote = |url: &Option<String>| NetworkConfig {
            url: url.clone(),
            accounts: accounts.clone(),
        };

        let mut networks = BTreeMap::new();
        networks.insert(BSC_NETWORK.to_string(), remote(&secrets.bsc_url));
        networks.insert(BSC_TESTNET_NETWORK.to_string(), remote(&secrets.bsctestnet_url));
        networks.insert(ETH_NETWORK.to_string(), remote(&secrets.eth_url));
        networks.insert(
            LOCALHOST_NETWORK.to_string(),
            NetworkConfig {
                url: Some(LOCALHOST_RPC_URL.to_string()),
                accounts: Vec::new(),
            },
        );

        Self {
            solidity: SolidityConfig::with_defaults(optimizer_enabled),
            networks,
            etherscan: EtherscanConfig {
                api_key: secrets.apikey.clone(),
            },
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadConfig(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseConfig(e.to_string()))
    }

    /// Resolve the network with the given name
    pub fn network(&self, name: &str) -> Result<NetworkProfile, ConfigError> {
        let network = self
            .networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))?;
        let rpc_url = network
            .url
            .clone()
            .ok_or_else(|| ConfigError::MissingNetworkUrl(name.to_string()))?;

        debug!(network = name, accounts = network.accounts.len(), "resolved network");
        Ok(NetworkProfile {
            name: name.to_string(),
            rpc_url,
            accounts: network.accounts.clone(),
            verification_api_key: self.etherscan.api_key.clone(),
        })
    }
}

/// Whether the optimizer should be enabled, per the `OPTIMIZER_DISABLED`
/// environment variable
pub fn optimizer_enabled_from_env() -> bool {
    optimizer_enabled(env::var(OPTIMIZER_DISABLED_ENV_VAR).ok().as_deref())
}

/// Any non-empty value disables the optimizer
fn optimizer_enabled(disabled_var: Option<&str>) -> bool {
    disabled_var.map_or(true, str::is_empty)
}
