//! Definitions of CLI arguments and commands for the deploy script

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use deploy_config::constants::LOCALHOST_NETWORK;

use crate::{
    commands::{compile, deploy},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONTRACT, DEFAULT_CONTRACTS_DIR, DEFAULT_SECRETS_PATH,
    },
    errors::ScriptError,
    types::ScriptContext,
    utils::load_config,
};

/// Compile and deploy the project's contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the network to deploy to
    #[arg(short, long, env = "NETWORK", default_value = LOCALHOST_NETWORK)]
    pub network: String,

    /// Path to the secret store holding RPC URLs and keys
    #[arg(short, long, env = "SECRETS_PATH", default_value = DEFAULT_SECRETS_PATH)]
    pub secrets: PathBuf,

    /// Path to a JSON config replacing the built-in one
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root, against which the other directories are resolved
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Directory holding the contract sources
    #[arg(long, default_value = DEFAULT_CONTRACTS_DIR)]
    pub contracts_dir: PathBuf,

    /// Directory compilation artifacts are written to
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Explicit `solc` binary to compile with
    #[arg(long, env = "SOLC")]
    pub solc: Option<PathBuf>,

    /// Private key of the deployer, overriding the network's accounts
    #[arg(long = "pkey", env = "PKEY", hide_env_values = true)]
    pub priv_key: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load the configuration and split the CLI into the run's context and
    /// the command to execute
    pub fn into_context(self) -> Result<(ScriptContext, Command), ScriptError> {
        let config = load_config(&self.secrets, self.config.as_deref())?;
        let ctx = ScriptContext {
            config,
            network: self.network,
            priv_key: self.priv_key,
            root: self.root,
            contracts_dir: self.contracts_dir,
            artifacts_dir: self.artifacts_dir,
            solc: self.solc,
        };

        Ok((ctx, self.command))
    }
}

/// The commands supported by the script
#[derive(Subcommand)]
pub enum Command {
    /// Compile and deploy a contract
    Deploy(DeployArgs),
    /// Compile a contract and write its artifact
    Compile(CompileArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, ctx: &ScriptContext) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, ctx).await.map(|_| ()),
            Command::Compile(args) => compile(args, ctx),
        }
    }
}

/// Deploy a contract with no constructor arguments
#[derive(Args)]
pub struct DeployArgs {
    /// Name of the contract, defined in `<contracts-dir>/<contract>.sol`
    #[arg(long, default_value = DEFAULT_CONTRACT)]
    pub contract: String,
}

/// Compile a contract
#[derive(Args)]
pub struct CompileArgs {
    /// Name of the contract, defined in `<contracts-dir>/<contract>.sol`
    #[arg(long, default_value = DEFAULT_CONTRACT)]
    pub contract: String,
}
