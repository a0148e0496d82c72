use std::process::ExitCode;

use clap::Parser;
use scripts::{
    cli::Cli,
    commands::{print_summary, run},
    diagnostics::Diagnostic,
    errors::SeedError,
};
use tokio::sync::watch;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_diagnostics = cli.json_diagnostics;

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Ctrl-C stops the sequence at the next step boundary, or while awaiting a confirmation
    let (abort_tx, abort_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping the seeding sequence");
            let _ = abort_tx.send(true);
        }
    });

    match run(cli, abort_rx).await {
        Ok(outcome) => {
            // The deployment confirmed, so the summary is printed before any
            // follow-up failure is reported
            print_summary(&outcome);
            let errors = outcome.follow_up_errors();
            for err in &errors {
                report(err, json_diagnostics);
            }

            errors
                .first()
                .map_or(ExitCode::SUCCESS, |err| ExitCode::from(err.exit_code()))
        }
        Err(err) => {
            report(&err, json_diagnostics);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Write the diagnostic for a failed run to stderr
fn report(err: &SeedError, json: bool) {
    let diagnostic = Diagnostic::from_error(err);
    if json {
        eprintln!("{}", diagnostic.to_json());
    } else {
        eprintln!("{}", diagnostic);
    }
}
