//! Errors from the script driver layer.

use thiserror::Error;

use super::status::ExitStatus;
use crate::tools::errors::ToolError;

/// Message attached to a user interrupt when it is re-raised by the driver.
pub const INTERRUPT_MESSAGE: &str = "Interrupted. Shutting down...";

/// Everything that can go wrong while driving a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The command line could not be parsed against the declared schema.
    #[error(transparent)]
    Usage(#[from] clap::Error),

    /// The user interrupted the run.
    #[error("{message}")]
    Interrupted {
        /// Human-readable context for the cancellation.
        message: String,
    },

    /// A utility-domain failure.
    #[error(transparent)]
    Tool(ToolError),

    /// Any other failure from a script body.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScriptError {
    /// A freshly observed user interrupt, before the driver clarifies it.
    #[must_use]
    pub fn interrupted() -> Self {
        Self::Interrupted {
            message: String::from("interrupt received"),
        }
    }

    /// The exit status this error maps to.
    #[must_use]
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Usage(_) => ExitStatus::Usage,
            Self::Interrupted { .. } => ExitStatus::Interrupted,
            Self::Tool(_) | Self::Other(_) => ExitStatus::Error,
        }
    }
}
