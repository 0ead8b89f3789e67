//! Code execution requests.

use std::marker::PhantomData;

use dsf_types::{Code, CodeChannel, CodeResult};
use serde::Serialize;
use serde_json::Value;

use super::{Command, Request, command};

impl Request for Code {
    const NAME: &'static str = "Code";
}

/// Asynchronous codes are only queued, so a successful reply may carry no
/// result yet.
impl Command for Code {
    type Output = Option<CodeResult>;
}

/// Runs a code given as text; the reply is the firmware output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleCode {
    /// Code text, possibly several codes on one line.
    pub code: String,
    /// Channel to run on.
    pub channel: CodeChannel,
}

impl SimpleCode {
    /// Builds the request.
    #[must_use]
    pub fn new(code: impl Into<String>, channel: CodeChannel) -> Self {
        Self {
            code: code.into(),
            channel,
        }
    }
}

command!(SimpleCode => String);

/// Waits for every code queued on `channel` to finish. The reply is false
/// when the wait was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Flush {
    /// Channel to flush.
    pub channel: CodeChannel,
}

command!(Flush => Option<bool>);

/// Evaluates a firmware expression such as `move.axes[0].homed` on a
/// channel; `T` is the expected result type.
#[derive(Debug, Serialize)]
#[serde(bound = "")]
pub struct EvaluateExpression<T = Value> {
    /// Channel whose context is used.
    pub channel: CodeChannel,
    /// Expression text.
    pub expression: String,
    #[serde(skip)]
    output: PhantomData<fn() -> T>,
}

impl<T> EvaluateExpression<T> {
    /// Builds the request.
    #[must_use]
    pub fn new(channel: CodeChannel, expression: impl Into<String>) -> Self {
        Self {
            channel,
            expression: expression.into(),
            output: PhantomData,
        }
    }
}

impl<T> Request for EvaluateExpression<T> {
    const NAME: &'static str = "EvaluateExpression";
}

impl<T: serde::de::DeserializeOwned> Command for EvaluateExpression<T> {
    type Output = T;
}

/// Checks a password as `M551` would.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckPassword {
    /// Password to check.
    pub password: String,
}

command!(CheckPassword => Option<bool>);
