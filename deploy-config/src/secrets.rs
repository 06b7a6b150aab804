//! The local secret store holding RPC URLs and keys

use std::{fs, path::Path};

use serde::Deserialize;

use crate::errors::ConfigError;

/// The contents of the secret store file
///
/// No field is validated here; a missing field only becomes an error
/// once something that needs it is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretStore {
    /// RPC URL of the BNB Smart Chain mainnet
    #[serde(default)]
    pub bsc_url: Option<String>,
    /// RPC URL of the BNB Smart Chain testnet
    #[serde(default)]
    pub bsctestnet_url: Option<String>,
    /// RPC URL of Ethereum mainnet
    #[serde(default)]
    pub eth_url: Option<String>,
    /// The deployer's private key
    #[serde(default)]
    pub key: Option<String>,
    /// The block explorer API key used for contract verification
    #[serde(default)]
    pub apikey: Option<String>,
}

impl SecretStore {
    /// Read the secret store from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadSecrets(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseSecrets(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_store() {
        let store: SecretStore =
            serde_json::from_str(r#"{ "bsc_url": "https://bsc.example", "key": "0x01" }"#)
                .unwrap();

        assert_eq!(store.bsc_url.as_deref(), Some("https://bsc.example"));
        assert_eq!(store.key.as_deref(), Some("0x01"));
        assert!(store.eth_url.is_none());
        assert!(store.apikey.is_none());
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/secret.json");
        let err = SecretStore::from_file(path).unwrap_err();
        assert!(matches!(err, ConfigError::ReadSecrets(_)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = std::env::temp_dir().join(format!("secrets-{}", rand::random::<u64>()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("secret.json");
        fs::write(&path, "module.exports = {}").unwrap();

        let err = SecretStore::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseSecrets(_)));

        fs::remove_dir_all(dir).unwrap();
    }
}
