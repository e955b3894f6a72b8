use clap::Parser;
use s3_delivery::cli::{run, Cli};
use s3_delivery::telemetry::init_tracing;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    tracing::debug!(?cli, "CLI arguments parsed, invoking run");

    match run(cli).await {
        Ok(()) => {
            tracing::debug!("CLI completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Cannot continue without credentials");
            ExitCode::FAILURE
        }
    }
}
