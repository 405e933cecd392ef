//! Exit status codes shared by every utility.
//!
//! Standard Unix conventions:
//! - 0: success
//! - 1: any runtime error
//! - 2: malformed command-line input (clap's usage-error code)
//! - 130: user interrupted (Ctrl+C, standard SIGINT exit code)

use std::process::{ExitCode, Termination};

/// The observable outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// The script body completed.
    Success = 0,
    /// The script body failed.
    Error = 1,
    /// The command line could not be parsed.
    Usage = 2,
    /// The user interrupted the run.
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}
