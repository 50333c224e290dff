//! CLI error types and conversions

use crate::client::ClientError;
use crate::pipeline::PipelineError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Listing or artifact client error
    #[error("client error: {0}")]
    ClientError(#[from] ClientError),

    /// Pipeline error
    #[error("pipeline error: {0}")]
    PipelineError(#[from] PipelineError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
