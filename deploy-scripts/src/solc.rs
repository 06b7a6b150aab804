//! Invocation of the `solc` compiler through its standard JSON interface

use std::{
    collections::BTreeMap,
    env,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::FromStr,
};

use deploy_config::{
    compiler::{CompilerSettings, EvmVersion, OptimizerSettings},
    version::SolcVersion,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    constants::{
        ERROR_SEVERITY, OUTPUT_SELECTION, SOLC_COMMAND, SOLIDITY_LANGUAGE, STANDARD_JSON_FLAG,
        VERSION_FLAG,
    },
    errors::ScriptError,
    sources::SourceGraph,
};

// ---------------
// | JSON Schema |
// ---------------

/// The input document of `solc --standard-json`
#[derive(Debug, Clone, Serialize)]
pub struct StandardJsonInput {
    /// The source language
    pub language: &'static str,
    /// The sources to compile, by source unit name
    pub sources: BTreeMap<String, SourceContent>,
    /// The compiler settings
    pub settings: StandardJsonSettings,
}

/// The contents of a single source
#[derive(Debug, Clone, Serialize)]
pub struct SourceContent {
    /// The source text
    pub content: String,
}

/// The `settings` block of the standard JSON input
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardJsonSettings {
    /// Optimizer settings
    pub optimizer: OptimizerSettings,
    /// The target EVM revision
    pub evm_version: EvmVersion,
    /// The outputs requested per file and contract
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl StandardJsonInput {
    /// Build the compiler input for every unit in a source graph
    pub fn new(graph: &SourceGraph, settings: &CompilerSettings) -> Self {
        let sources = graph
            .units()
            .map(|unit| {
                let content = SourceContent { content: unit.content.clone() };
                (unit.name.clone(), content)
            })
            .collect();

        let outputs: Vec<String> = OUTPUT_SELECTION.iter().map(|s| s.to_string()).collect();
        let output_selection =
            BTreeMap::from([("*".to_string(), BTreeMap::from([("*".to_string(), outputs)]))]);

        Self {
            language: SOLIDITY_LANGUAGE,
            sources,
            settings: StandardJsonSettings {
                optimizer: settings.optimizer,
                evm_version: settings.evm_version,
                output_selection,
            },
        }
    }
}

/// The output document of `solc --standard-json`
#[derive(Debug, Clone, Deserialize)]
pub struct StandardJsonOutput {
    /// Errors and warnings emitted by the compiler
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    /// Compiled contracts, by source unit name and contract name
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

/// A compiler error or warning
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// `error`, `warning` or `info`
    pub severity: String,
    /// The bare message
    pub message: String,
    /// The message with source location, when available
    #[serde(default)]
    pub formatted_message: Option<String>,
}

impl Diagnostic {
    /// The most descriptive form of the message
    pub fn text(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message).trim()
    }
}

/// The compiler output for a single contract
#[derive(Debug, Clone, Deserialize)]
pub struct ContractOutput {
    /// The contract ABI
    #[serde(default)]
    pub abi: serde_json::Value,
    /// The EVM outputs
    pub evm: EvmOutput,
}

/// The EVM section of a contract's output
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmOutput {
    /// The creation bytecode
    pub bytecode: BytecodeOutput,
    /// The runtime bytecode
    pub deployed_bytecode: BytecodeOutput,
}

/// A bytecode object and its unresolved library references
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BytecodeOutput {
    /// The hex-encoded bytecode, without a `0x` prefix
    pub object: String,
    /// Library placeholders left in the bytecode, by source unit name
    #[serde(default)]
    pub link_references: BTreeMap<String, serde_json::Value>,
}

impl StandardJsonOutput {
    /// Fail on any error-severity diagnostic, logging the rest
    pub fn check_diagnostics(&self) -> Result<(), ScriptError> {
        let (errors, others): (Vec<_>, Vec<_>) =
            self.errors.iter().partition(|d| d.severity == ERROR_SEVERITY);

        for diagnostic in others {
            warn!("{}", diagnostic.text());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            let msg = errors.iter().map(|d| d.text()).join("\n");
            Err(ScriptError::CompilationError(msg))
        }
    }
}

// ------------
// | Compiler |
// ------------

/// A `solc` binary of a known version
#[derive(Debug, Clone)]
pub struct Solc {
    /// The path or command name of the binary
    pub path: PathBuf,
    /// The release the binary reports
    pub version: SolcVersion,
}

impl Solc {
    /// Find a `solc` binary for the given release
    ///
    /// An explicitly given binary is always used. Otherwise `solc-<version>`
    /// is looked up on `PATH`, then a plain `solc` reporting the right version.
    pub fn find(version: SolcVersion, explicit: Option<&Path>) -> Result<Self, ScriptError> {
        if let Some(path) = explicit {
            let reported = Self::version_of(path)?;
            if reported != version {
                warn!("using solc {} at {} for a {} profile", reported, path.display(), version);
            }
            return Ok(Self { path: path.to_path_buf(), version: reported });
        }

        if let Some(path) = find_on_path(&format!("{SOLC_COMMAND}-{version}")) {
            return Ok(Self { path, version });
        }

        if let Some(path) = find_on_path(SOLC_COMMAND) {
            let reported = Self::version_of(&path)?;
            if reported == version {
                return Ok(Self { path, version });
            }
            return Err(ScriptError::CompilationError(format!(
                "solc {} required but {} reports {}",
                version,
                path.display(),
                reported
            )));
        }

        Err(ScriptError::CompilationError(format!("solc {} not found on PATH", version)))
    }

    /// Ask a binary for its release version
    pub fn version_of(path: &Path) -> Result<SolcVersion, ScriptError> {
        let output = Command::new(path)
            .arg(VERSION_FLAG)
            .output()
            .map_err(|e| ScriptError::CompilationError(format!("{}: {}", path.display(), e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_version_output(&stdout).ok_or_else(|| {
            ScriptError::CompilationError(format!(
                "could not determine version of {}",
                path.display()
            ))
        })
    }

    /// Run the compiler on the given input
    pub fn compile(&self, input: &StandardJsonInput) -> Result<StandardJsonOutput, ScriptError> {
        let input_json = serde_json::to_vec(input)
            .map_err(|e| ScriptError::CompilationError(e.to_string()))?;

        info!(solc = %self.version, sources = input.sources.len(), "compiling");
        let mut child = Command::new(&self.path)
            .arg(STANDARD_JSON_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ScriptError::CompilationError(format!("{}: {}", self.path.display(), e)))?;

        child
            .stdin
            .take()
            .ok_or_else(|| ScriptError::CompilationError("solc stdin unavailable".to_string()))?
            .write_all(&input_json)
            .map_err(|e| ScriptError::CompilationError(e.to_string()))?;

        let output = child
            .wait_with_output()
            .map_err(|e| ScriptError::CompilationError(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScriptError::CompilationError(format!(
                "solc exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let parsed: StandardJsonOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| ScriptError::CompilationError(format!("malformed solc output: {}", e)))?;
        parsed.check_diagnostics()?;

        Ok(parsed)
    }
}

/// Extract the release from `solc --version` output, e.g.
/// `Version: 0.8.1+commit.df193b15.Linux.g++`
fn parse_version_output(output: &str) -> Option<SolcVersion> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Version:"))
        .and_then(|v| SolcVersion::from_str(v.trim()).ok())
}

/// Find an executable with the given name on `PATH`
fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    find_in_dirs(env::split_paths(&paths), name)
}

/// Find the first executable with the given name in a list of directories
fn find_in_dirs(dirs: impl IntoIterator<Item = PathBuf>, name: &str) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Whether a path is a file the current user may execute
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether a path is a file the current user may execute
#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
