//! Type definitions used throughout the deploy script

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use deploy_config::DeployConfig;

/// Everything a command needs to know about the run, resolved from the CLI
/// at startup and immutable afterwards
#[derive(Debug, Clone)]
pub struct ScriptContext {
    /// The deployment configuration
    pub config: DeployConfig,
    /// The name of the selected network
    pub network: String,
    /// A private key overriding the network's configured accounts
    pub priv_key: Option<String>,
    /// The project root
    pub root: PathBuf,
    /// The contracts directory, relative to the project root
    pub contracts_dir: PathBuf,
    /// The artifacts directory, relative to the project root
    pub artifacts_dir: PathBuf,
    /// An explicit `solc` binary
    pub solc: Option<PathBuf>,
}

/// The outcome of a successful deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentResult {
    /// The address of the deployed contract
    pub contract_address: Address,
    /// The address of the account that deployed it
    pub deployer_address: Address,
    /// The deployer's balance before deploying, in wei
    pub deployer_balance_at_start: U256,
}
