//! Solidity compiler profiles and automatic compiler selection

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_COMPILER_VERSIONS, DEFAULT_EVM_VERSION, DEFAULT_OPTIMIZER_RUNS},
    errors::ConfigError,
    version::{SolcVersion, VersionReq},
};

/// The EVM revision targeted by the compiled bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvmVersion {
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    Paris,
    Shanghai,
    Cancun,
    Prague,
}

/// Optimizer settings passed through to `solc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Whether the optimizer is enabled
    pub enabled: bool,
    /// The number of runs the optimizer tunes for
    pub runs: u32,
}

/// The `settings` block of a compiler profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    /// Optimizer settings
    pub optimizer: OptimizerSettings,
    /// The target EVM revision
    pub evm_version: EvmVersion,
}

/// A compiler version together with the settings it is invoked with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerProfile {
    /// The `solc` release
    pub version: SolcVersion,
    /// The settings used with this release
    pub settings: CompilerSettings,
}

impl CompilerProfile {
    /// A profile for the given version with the project's default settings
    pub fn with_defaults(version: SolcVersion, optimizer_enabled: bool) -> Self {
        Self {
            version,
            settings: CompilerSettings {
                optimizer: OptimizerSettings {
                    enabled: optimizer_enabled,
                    runs: DEFAULT_OPTIMIZER_RUNS,
                },
                evm_version: DEFAULT_EVM_VERSION,
            },
        }
    }
}

/// The set of compilers available to the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityConfig {
    /// The configured compilers
    pub compilers: Vec<CompilerProfile>,
}

impl SolidityConfig {
    /// The project's default compilers
    pub fn with_defaults(optimizer_enabled: bool) -> Self {
        let compilers = DEFAULT_COMPILER_VERSIONS
            .iter()
            .map(|v| CompilerProfile::with_defaults(*v, optimizer_enabled))
            .collect();

        Self { compilers }
    }

    /// Select the newest configured compiler satisfying every given pragma
    pub fn select(&self, pragmas: &[VersionReq]) -> Result<&CompilerProfile, ConfigError> {
        self.compilers
            .iter()
            .filter(|profile| pragmas.iter().all(|req| req.matches(&profile.version)))
            .max_by_key(|profile| profile.version)
            .ok_or_else(|| {
                let reqs = pragmas.iter().map(VersionReq::as_str).join(", ");
                ConfigError::NoMatchingCompiler(format!("[{reqs}]"))
            })
    }
}
