//! Command-line interface of `dsfctl`.

use clap::{Parser, Subcommand, ValueEnum};
use dsf_client::{InterceptionMode, SubscriptionMode};
use dsf_types::CodeChannel;

/// Talks to the Duet control server from the shell.
#[derive(Parser, Debug)]
#[command(name = "dsfctl", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Runs codes one after another and prints their replies.
    Code {
        /// Channel the codes are executed on.
        #[arg(long, value_enum, default_value_t = ChannelArg::Sbc)]
        channel: ChannelArg,
        /// Code lines such as `M115` or `G28 X`.
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<String>,
    },
    /// Prints the object model as JSON.
    Model,
    /// Prints object model updates until the server hangs up.
    Subscribe {
        /// Whether updates carry the full model or only what changed.
        #[arg(long, value_enum, default_value_t = SubscribeModeArg::Patch)]
        mode: SubscribeModeArg,
        /// Object model paths to follow, such as `state/**`.
        #[arg(long = "filter", value_name = "PATH")]
        filters: Vec<String>,
    },
    /// Intercepts codes, prints them and lets them run.
    Intercept {
        /// When codes are intercepted.
        #[arg(long, value_enum, default_value_t = InterceptModeArg::Pre)]
        mode: InterceptModeArg,
        /// Codes to intercept, such as `M98`; all when omitted.
        #[arg(long = "filter", value_name = "CODE")]
        filters: Vec<String>,
        /// Codes to resolve without running them.
        #[arg(long = "resolve", value_name = "CODE")]
        resolve: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ChannelArg {
    Http,
    Telnet,
    File,
    Usb,
    Aux,
    Trigger,
    Queue,
    Lcd,
    Sbc,
    Daemon,
    Aux2,
    AutoPause,
}

impl From<ChannelArg> for CodeChannel {
    fn from(value: ChannelArg) -> Self {
        match value {
            ChannelArg::Http => Self::Http,
            ChannelArg::Telnet => Self::Telnet,
            ChannelArg::File => Self::File,
            ChannelArg::Usb => Self::Usb,
            ChannelArg::Aux => Self::Aux,
            ChannelArg::Trigger => Self::Trigger,
            ChannelArg::Queue => Self::Queue,
            ChannelArg::Lcd => Self::Lcd,
            ChannelArg::Sbc => Self::Sbc,
            ChannelArg::Daemon => Self::Daemon,
            ChannelArg::Aux2 => Self::Aux2,
            ChannelArg::AutoPause => Self::AutoPause,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SubscribeModeArg {
    Full,
    Patch,
}

impl From<SubscribeModeArg> for SubscriptionMode {
    fn from(value: SubscribeModeArg) -> Self {
        match value {
            SubscribeModeArg::Full => Self::Full,
            SubscribeModeArg::Patch => Self::Patch,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum InterceptModeArg {
    Pre,
    Post,
    Executed,
}

impl From<InterceptModeArg> for InterceptionMode {
    fn from(value: InterceptModeArg) -> Self {
        match value {
            InterceptModeArg::Pre => Self::Pre,
            InterceptModeArg::Post => Self::Post,
            InterceptModeArg::Executed => Self::Executed,
        }
    }
}
