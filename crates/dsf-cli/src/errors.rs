//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use dsf_client::ConnectionError;
use dsf_client::shutdown::ShutdownError;
use dsf_client::telemetry::TelemetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to set up logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("failed to watch for termination signals: {0}")]
    Signals(#[from] ShutdownError),
    #[error("failed to encode output: {0}")]
    Encode(serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}
