//! Entry point of `dsfctl`.
//!
//! Everything happens in [`dsf_cli::run`]; this file only hands it the
//! process arguments and the locked standard streams.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    dsf_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
