use std::process::ExitCode;

use clap::Parser;
use deploy_scripts::{cli::Cli, errors::ScriptError};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr, leaving stdout to the deployment report
    tracing_subscriber::fmt()
        .pretty()
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load the configuration once and run the selected command
async fn run(cli: Cli) -> Result<(), ScriptError> {
    let (ctx, command) = cli.into_context()?;
    command.run(&ctx).await
}
