//! Runtime of `dsfctl`, a small command-line client for the Duet control
//! server.
//!
//! Arguments are split into configuration flags, which must come first, and
//! a subcommand parsed by clap. Configuration is layered by `ortho-config`,
//! logging goes to stderr and command output to stdout. Both streams are
//! passed in so tests can capture them.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use dsf_client::ShutdownCoordinator;
use dsf_client::telemetry;

mod cli;
mod commands;
mod config;
mod errors;

use cli::{Cli, CliCommand};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::split_config_arguments;
pub(crate) use errors::AppError;

/// Whether long-running subcommands install termination signal handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalHandling {
    Install,
    Skip,
}

/// Runs the CLI with the given arguments, writing command output to
/// `stdout` and diagnostics to `stderr`.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(
        args,
        stdout,
        stderr,
        &OrthoConfigLoader,
        SignalHandling::Install,
    )
}

#[must_use]
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    signals: SignalHandling,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let arguments: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&arguments);
    let cli = match Cli::try_parse_from(&split.cli_arguments) {
        Ok(parsed) => parsed,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            return match write!(stdout, "{}", error.render()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            };
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    let outcome = loader
        .load(&split.config_arguments)
        .and_then(|config| {
            telemetry::initialise(&config)?;
            Ok(config)
        })
        .and_then(|config| {
            let shutdown = Arc::new(ShutdownCoordinator::new());
            if is_long_running(&cli.command) && signals == SignalHandling::Install {
                let _listener = shutdown.listen_for_signals()?;
            }
            commands::execute(&cli.command, &config, &shutdown, stdout)
        });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

const fn is_long_running(command: &CliCommand) -> bool {
    matches!(
        command,
        CliCommand::Subscribe { .. } | CliCommand::Intercept { .. }
    )
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    drop(writeln!(stderr, "dsfctl: {error}"));
    ExitCode::FAILURE
}
