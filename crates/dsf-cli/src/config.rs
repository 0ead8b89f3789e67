//! Configuration loading for `dsfctl`.
//!
//! Configuration flags come before the subcommand. They are split off and
//! handed to `ortho-config` on their own so clap only sees the subcommand
//! and its arguments.

use std::ffi::{OsStr, OsString};

use dsf_config::Config;
use ortho_config::OrthoConfig as _;

use crate::AppError;

/// Flags understood by the configuration loader.
///
/// Must match the fields of [`Config`] plus `--config-path`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] =
    &["--config-path", "--socket", "--log-filter", "--log-format"];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name followed by the
    /// configuration flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((name, _)) => (name, true),
        None => (text.as_ref(), false),
    };
    if flag.starts_with("--") && CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the configuration flags and their values.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by everything meant for clap.
    pub(crate) cli_arguments: Vec<OsString>,
}

/// Splits leading configuration flags from the rest of the command line.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };
    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter().peekable();
    while let Some(&argument) = remaining.peek() {
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                remaining.next();
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Stop => break,
        }
    }
    let mut cli_arguments = vec![program.clone()];
    cli_arguments.extend(remaining.cloned());
    ConfigArgumentSplit {
        config_arguments,
        cli_arguments,
    }
}
