//! Definitions of errors that can occur during the execution of the deploy script

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use deploy_config::errors::ConfigError;

/// Errors that can occur during the execution of the deploy script
#[derive(Debug)]
pub enum ScriptError {
    /// Error loading or querying the configuration
    Config(ConfigError),
    /// The selected network has no account to sign with
    NoSignerAvailable(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// The network endpoint could not be reached
    RpcUnavailable(String),
    /// The compiler rejected the sources, or could not be run
    CompilationError(String),
    /// Error writing a compilation artifact
    ArtifactWriting(String),
    /// The deployer cannot pay for the deployment
    InsufficientFunds(String),
    /// The deployment ran out of gas
    OutOfGas(String),
    /// The deployment reverted
    TransactionReverted(String),
    /// Any other error deploying a contract
    ContractDeployment(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Config(e) => write!(f, "configuration error: {}", e),
            ScriptError::NoSignerAvailable(s) => {
                write!(f, "no signer available on network: {}", s)
            }
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::RpcUnavailable(s) => write!(f, "RPC endpoint unavailable: {}", s),
            ScriptError::CompilationError(s) => write!(f, "error compiling contract: {}", s),
            ScriptError::ArtifactWriting(s) => write!(f, "error writing artifact: {}", s),
            ScriptError::InsufficientFunds(s) => {
                write!(f, "insufficient funds for deployment: {}", s)
            }
            ScriptError::OutOfGas(s) => write!(f, "deployment ran out of gas: {}", s),
            ScriptError::TransactionReverted(s) => write!(f, "deployment reverted: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScriptError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for ScriptError {
    fn from(e: ConfigError) -> Self {
        ScriptError::Config(e)
    }
}
