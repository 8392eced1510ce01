//! storadm - storage cluster administration
//!
//! Exit status: 0 on success, 1 when the cluster or the tool itself failed
//! (a JSON error envelope is printed on stdout), 2 on usage errors (message
//! on stderr, nothing on stdout).

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use storadm::cli::Cli;
use storadm::client::TcpConnector;
use storadm::commands;
use storadm::logging;
use storadm::output::{ErrorReport, Printer};
use storadm_core::UsageError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let invocation = match commands::prepare(&cli.command) {
        Ok(invocation) => invocation,
        Err(err) => usage_exit(cli.command.name(), &err),
    };

    let mut printer = Printer::stdout();

    if let Err(err) = logging::init(&invocation.config) {
        return report(&mut printer, ErrorReport::internal(format!("{:#}", err)));
    }
    tracing::info!(command = cli.command.name(), "storadm starting");

    match commands::execute(&invocation, &TcpConnector).await {
        Ok(output) => match printer.print(&output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write output");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            tracing::error!(code = err.code, message = %err.message, "Command failed");
            report(&mut printer, ErrorReport::from(&err))
        }
    }
}

fn report(printer: &mut Printer, report: ErrorReport) -> ExitCode {
    if let Err(e) = printer.print_error(report) {
        tracing::error!(error = %e, "Failed to write error report");
    }
    ExitCode::FAILURE
}

/// Print a usage error the way the argument parser does and exit with status 2
fn usage_exit(command: &str, err: &UsageError) -> ! {
    let kind = match err {
        UsageError::NoRemotes | UsageError::MissingBackendId(_) => {
            ErrorKind::MissingRequiredArgument
        }
        UsageError::SingleRemoteRequired(_) => ErrorKind::ArgumentConflict,
        UsageError::Config(_) => ErrorKind::InvalidValue,
    };

    let mut cmd = Cli::command();
    cmd.build();
    match cmd.find_subcommand_mut(command) {
        Some(sub) => sub.error(kind, err).exit(),
        None => cmd.error(kind, err).exit(),
    }
}
