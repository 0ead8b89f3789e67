//! Code channels: the logical sources and sinks of code execution.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Logical source of a code (a USB line, an HTTP request, a macro file, …).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CodeChannel {
    /// Codes submitted through HTTP requests.
    #[serde(rename = "HTTP")]
    #[strum(serialize = "HTTP")]
    Http,
    /// Codes submitted through Telnet.
    Telnet,
    /// Codes from a running file job.
    File,
    /// Codes received over USB.
    #[serde(rename = "USB")]
    #[strum(serialize = "USB")]
    Usb,
    /// Serial devices other than USB, such as a PanelDue.
    Aux,
    /// Trigger macros and `config.g`.
    Trigger,
    /// Codes executed in sync with queued moves.
    Queue,
    /// Auxiliary LCD devices.
    #[serde(rename = "LCD")]
    #[strum(serialize = "LCD")]
    Lcd,
    /// Codes from the single-board computer; the default for clients.
    #[default]
    #[serde(rename = "SBC")]
    #[strum(serialize = "SBC")]
    Sbc,
    /// Daemon tasks such as `daemon.g`.
    Daemon,
    /// The second UART port.
    Aux2,
    /// Power-fail, heater-fault and filament-out macros.
    AutoPause,
    /// Channel could not be determined.
    Unknown,
}

impl CodeChannel {
    /// Every channel, in wire order.
    pub const ALL: [Self; 13] = [
        Self::Http,
        Self::Telnet,
        Self::File,
        Self::Usb,
        Self::Aux,
        Self::Trigger,
        Self::Queue,
        Self::Lcd,
        Self::Sbc,
        Self::Daemon,
        Self::Aux2,
        Self::AutoPause,
        Self::Unknown,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CodeChannel::Http, "\"HTTP\"")]
    #[case(CodeChannel::Sbc, "\"SBC\"")]
    #[case(CodeChannel::AutoPause, "\"AutoPause\"")]
    fn uses_server_channel_names(#[case] channel: CodeChannel, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&channel).expect("serialise"), json);
        assert_eq!(
            serde_json::from_str::<CodeChannel>(json).expect("deserialise"),
            channel
        );
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("sbc".parse::<CodeChannel>().ok(), Some(CodeChannel::Sbc));
        assert_eq!("telnet".parse::<CodeChannel>().ok(), Some(CodeChannel::Telnet));
        assert_eq!(CodeChannel::Usb.to_string(), "USB");
    }

    #[test]
    fn defaults_to_sbc() {
        assert_eq!(CodeChannel::default(), CodeChannel::Sbc);
    }
}
