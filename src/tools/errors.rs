//! Errors from the utility domain layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::script::ScriptError;

/// Everything the individual utilities can fail with.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A directory entry could not be read while walking.
    #[error("failed to read '{}'", path.display())]
    Walk {
        /// The path being walked.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A pool file could not be parsed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// A `conda env export` dump could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// The requested column does not exist in the pool.
    #[error("no column '{column}' in pool '{}'", pool.display())]
    NoColumn {
        /// The column that was asked for.
        column: String,
        /// The pool file that lacks it.
        pool: PathBuf,
    },

    /// No `*_pool.csv` files were found.
    #[error("no pool files found under '{}'", dir.display())]
    NoPools {
        /// The directory that was searched.
        dir: PathBuf,
    },

    /// An existing pool name does not follow the pool naming convention.
    #[error("existing pool cannot be parsed: '{name}'")]
    BadPoolName {
        /// The offending file name.
        name: String,
    },

    /// A download filename may not contain path separators.
    #[error("filename cannot include directories: '{0}'")]
    BadFilename(String),

    /// No MAST API token was supplied.
    #[error("no MAST API token; set MAST_API_TOKEN or pass --token")]
    MissingToken,

    /// The requested output location exists but is not a directory.
    #[error("output location '{}' is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The output file already exists and overwriting was not requested.
    #[error("'{}' exists, not overwritten", path.display())]
    AlreadyExists {
        /// The file that would have been clobbered.
        path: PathBuf,
    },

    /// An HTTP download failed.
    #[error("download from '{url}' failed")]
    Download {
        /// The endpoint that was contacted.
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// A child process could not be started.
    #[error("failed to run '{command}'")]
    CommandSpawn {
        /// The command that could not be spawned.
        command: &'static str,
        #[source]
        source: io::Error,
    },

    /// A child process ran but reported failure.
    #[error("'{command}' failed: {stderr}")]
    CommandFailed {
        /// The command that failed.
        command: &'static str,
        /// Its captured standard error.
        stderr: String,
    },

    /// A required environment variable is missing.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// The user interrupted the run.
    #[error("interrupted")]
    Interrupted,
}

/// Route domain failures into the driver's error surface. An interrupt
/// observed deep in a tool loop becomes the driver's cancellation signal.
impl From<ToolError> for ScriptError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Interrupted => Self::interrupted(),
            other => Self::Tool(other),
        }
    }
}
