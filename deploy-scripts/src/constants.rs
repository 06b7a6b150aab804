//! Constants used in the deploy script

/// The contract deployed when none is specified
pub const DEFAULT_CONTRACT: &str = "DepositSplit";

/// The default path of the secret store
pub const DEFAULT_SECRETS_PATH: &str = "secret.json";

/// The default directory holding the project's contract sources
pub const DEFAULT_CONTRACTS_DIR: &str = "contracts";

/// The default directory compilation artifacts are written to
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The directory searched for package imports, e.g. `@openzeppelin/...`
pub const NODE_MODULES_DIR: &str = "node_modules";

/// The extension of Solidity source files
pub const SOLIDITY_EXTENSION: &str = "sol";

/// The extension of artifact files
pub const ARTIFACT_EXTENSION: &str = "json";

/// The name of the generic `solc` command
pub const SOLC_COMMAND: &str = "solc";

/// The flag selecting `solc`'s standard JSON interface
pub const STANDARD_JSON_FLAG: &str = "--standard-json";

/// The flag asking `solc` for its version
pub const VERSION_FLAG: &str = "--version";

/// The source language declared in the standard JSON input
pub const SOLIDITY_LANGUAGE: &str = "Solidity";

/// The compiler outputs requested for every contract
pub const OUTPUT_SELECTION: [&str; 4] = [
    "abi",
    "evm.bytecode.object",
    "evm.bytecode.linkReferences",
    "evm.deployedBytecode.object",
];

/// The severity of compiler diagnostics that fail a compilation
pub const ERROR_SEVERITY: &str = "error";

/// Substrings of node error messages reporting an unfunded sender
pub const INSUFFICIENT_FUNDS_MESSAGES: [&str; 2] = ["insufficient funds", "insufficient balance"];

/// Substrings of node error messages reporting gas exhaustion
pub const OUT_OF_GAS_MESSAGES: [&str; 3] =
    ["out of gas", "gas required exceeds", "intrinsic gas too low"];

/// Substring of node error messages reporting a revert
pub const REVERT_MESSAGE: &str = "revert";
