mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use hapticforge::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(cli));
    // A pending stdin read would otherwise hold the runtime open.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hapticforge stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), HapticError> {
    let config = cli
        .client_config()
        .map_err(|e| HapticError::Config(format!("cannot read alias file: {e}")))?;

    let client = HapticClient::builder().config(config).build().await?;

    tokio::spawn(read_commands(client.session()));
    tokio::spawn(stop_on_ctrl_c(client.session()));

    client.run().await
}

/// Feeds stdin lines to the session. End of input shuts it down.
async fn read_commands(session: SessionHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if session.command(line).await.is_err() {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        }
    }
    tracing::info!("input closed, stopping devices");
    let _ = session.shutdown().await;
}

async fn stop_on_ctrl_c(session: SessionHandle) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("interrupted, stopping devices");
        let _ = session.shutdown().await;
    }
}
