//! Definitions of errors that can occur while assembling the deployment configuration

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur while loading or querying the deployment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Error reading the secret store file
    ReadSecrets(String),
    /// Error parsing the secret store file
    ParseSecrets(String),
    /// Error reading a configuration file
    ReadConfig(String),
    /// Error parsing a configuration file
    ParseConfig(String),
    /// The requested network is not configured
    UnknownNetwork(String),
    /// The requested network has no RPC URL
    MissingNetworkUrl(String),
    /// A compiler version string could not be parsed
    InvalidVersion(String),
    /// A version pragma could not be parsed
    InvalidPragma(String),
    /// No configured compiler satisfies the version pragmas of the sources
    NoMatchingCompiler(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadSecrets(s) => write!(f, "error reading secret store: {}", s),
            ConfigError::ParseSecrets(s) => write!(f, "error parsing secret store: {}", s),
            ConfigError::ReadConfig(s) => write!(f, "error reading config: {}", s),
            ConfigError::ParseConfig(s) => write!(f, "error parsing config: {}", s),
            ConfigError::UnknownNetwork(s) => write!(f, "unknown network: {}", s),
            ConfigError::MissingNetworkUrl(s) => {
                write!(f, "no RPC URL configured for network: {}", s)
            }
            ConfigError::InvalidVersion(s) => write!(f, "invalid compiler version: {}", s),
            ConfigError::InvalidPragma(s) => write!(f, "invalid version pragma: {}", s),
            ConfigError::NoMatchingCompiler(s) => {
                write!(f, "no configured compiler matches: {}", s)
            }
        }
    }
}

impl Error for ConfigError {}
