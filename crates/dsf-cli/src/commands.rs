//! Subcommand implementations.

use std::io::Write;
use std::path::Path;

use dsf_client::{
    CommandConnection, CommandSession, ConnectionError, InterceptConnection, InterceptOptions,
    ShutdownCoordinator, SubscribeConnection, SubscribeOptions,
};
use dsf_config::Config;
use dsf_types::{Code, CodeChannel, MessageType};
use serde_json::Value;
use tracing::{info, warn};

use crate::AppError;
use crate::cli::CliCommand;

const CLI_TARGET: &str = "dsf_cli::command";

/// What the interceptor did with one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Ignored,
    Resolved,
    Cancelled,
}

impl Disposition {
    const fn label(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }
}

pub(crate) fn execute<W>(
    command: &CliCommand,
    config: &Config,
    shutdown: &ShutdownCoordinator,
    stdout: &mut W,
) -> Result<(), AppError>
where
    W: Write,
{
    let path = config.socket().path().as_std_path();
    match command {
        CliCommand::Code { channel, codes } => run_codes(path, (*channel).into(), codes, stdout)?,
        CliCommand::Model => print_model(path, stdout)?,
        CliCommand::Subscribe { mode, filters } => {
            let options = SubscribeOptions {
                mode: (*mode).into(),
                filters: filters.clone(),
            };
            follow_updates(path, options, shutdown, stdout)?;
        }
        CliCommand::Intercept {
            mode,
            filters,
            resolve,
        } => {
            let options = InterceptOptions {
                filters: filters.clone(),
                ..InterceptOptions::new((*mode).into())
            };
            intercept_codes(path, options, resolve, shutdown, stdout)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn run_codes<W: Write>(
    path: &Path,
    channel: CodeChannel,
    codes: &[String],
    stdout: &mut W,
) -> Result<(), AppError> {
    let mut connection = CommandConnection::connect(path)?;
    for code in codes {
        let reply = connection.perform_simple_code(code, channel)?;
        let trimmed = reply.trim_end();
        if !trimmed.is_empty() {
            writeln!(stdout, "{trimmed}")?;
        }
    }
    Ok(())
}

fn print_model<W: Write>(path: &Path, stdout: &mut W) -> Result<(), AppError> {
    let mut connection = CommandConnection::connect(path)?;
    let model = connection.get_serialized_object_model()?;
    write_json(stdout, &model, true)
}

fn follow_updates<W: Write>(
    path: &Path,
    options: SubscribeOptions,
    shutdown: &ShutdownCoordinator,
    stdout: &mut W,
) -> Result<(), AppError> {
    let mut connection = SubscribeConnection::connect(path, options)?;
    shutdown.register(Box::new(connection.inner().closer()?));
    loop {
        match connection.receive_patch() {
            Ok(Some(update)) => write_json(stdout, &update, false)?,
            Ok(None) => return Ok(()),
            Err(_) if shutdown.is_closed() => return Ok(()),
            Err(error) => return Err(error.into()),
        }
    }
}

fn intercept_codes<W: Write>(
    path: &Path,
    options: InterceptOptions,
    resolve: &[String],
    shutdown: &ShutdownCoordinator,
    stdout: &mut W,
) -> Result<(), AppError> {
    let mut connection = InterceptConnection::connect(path, options)?;
    shutdown.register(Box::new(connection.inner().closer()?));
    loop {
        let code = match connection.receive_code() {
            Ok(Some(received)) => received,
            Ok(None) => return Ok(()),
            Err(_) if shutdown.is_closed() => return Ok(()),
            Err(error) => return Err(error.into()),
        };
        let disposition = answer(&mut connection, &code, resolve)?;
        info!(
            target: CLI_TARGET,
            code = %code,
            channel = %code.channel,
            disposition = disposition.label(),
            "intercepted code"
        );
        writeln!(stdout, "{code} [{}]", disposition.label())?;
        stdout.flush()?;
    }
}

/// Resolves codes named in `resolve` once everything queued before them has
/// run and lets every other code through. A flush the server reports as
/// unsuccessful, or answers with a command error, cancels the code.
pub(crate) fn answer(
    connection: &mut InterceptConnection,
    code: &Code,
    resolve: &[String],
) -> Result<Disposition, ConnectionError> {
    let command = code.short_string();
    if !resolve
        .iter()
        .any(|wanted| wanted.trim().eq_ignore_ascii_case(&command))
    {
        connection.ignore_code()?;
        return Ok(Disposition::Ignored);
    }
    let flushed = match connection.flush() {
        Ok(flushed) => flushed,
        Err(error) if error.as_command_error().is_some() => {
            warn!(target: CLI_TARGET, code = %code, %error, "flush before resolving failed");
            false
        }
        Err(error) => return Err(error),
    };
    if flushed {
        connection.resolve_code(MessageType::Success, "")?;
        Ok(Disposition::Resolved)
    } else {
        connection.cancel_code()?;
        Ok(Disposition::Cancelled)
    }
}

fn write_json<W: Write>(stdout: &mut W, value: &Value, pretty: bool) -> Result<(), AppError> {
    let encoded = if pretty {
        serde_json::to_writer_pretty(&mut *stdout, value)
    } else {
        serde_json::to_writer(&mut *stdout, value)
    };
    encoded.map_err(AppError::Encode)?;
    writeln!(stdout)?;
    Ok(())
}
