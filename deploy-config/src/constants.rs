//! Constants defining the project's default configuration

use crate::{compiler::EvmVersion, version::SolcVersion};

/// The compiler releases configured by default
pub const DEFAULT_COMPILER_VERSIONS: [SolcVersion; 2] =
    [SolcVersion::new(0, 8, 1), SolcVersion::new(0, 8, 0)];

/// The number of optimizer runs used by default
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 2000;

/// The EVM revision targeted by default
pub const DEFAULT_EVM_VERSION: EvmVersion = EvmVersion::Berlin;

/// The environment variable which, when set to a non-empty value,
/// disables the optimizer for every compiler profile
pub const OPTIMIZER_DISABLED_ENV_VAR: &str = "OPTIMIZER_DISABLED";

/// The BNB Smart Chain mainnet network name
pub const BSC_NETWORK: &str = "bsc";

/// The BNB Smart Chain testnet network name
pub const BSC_TESTNET_NETWORK: &str = "bsctestnet";

/// The Ethereum mainnet network name
pub const ETH_NETWORK: &str = "eth";

/// The name of the local development network
pub const LOCALHOST_NETWORK: &str = "localhost";

/// The RPC URL of the local development network
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";
