//! Network endpoints and the signing keys used on them

use serde::{Deserialize, Serialize};

/// A network entry as it appears in the configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The RPC URL of the network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Private keys of the accounts available on the network
    #[serde(default)]
    pub accounts: Vec<String>,
}

/// The resolved settings of the network selected for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    /// The network's name
    pub name: String,
    /// The RPC URL of the network
    pub rpc_url: String,
    /// Private keys of the accounts available on the network
    pub accounts: Vec<String>,
    /// The block explorer API key, if one is configured
    pub verification_api_key: Option<String>,
}

impl NetworkProfile {
    /// The key of the first available account, which signs every transaction
    pub fn signing_key(&self) -> Option<&str> {
        self.accounts.first().map(String::as_str)
    }
}
