//! Pluggable diagnostic handler.
//!
//! The `--pdb` and `--post-mortem` flags ask for operator-facing diagnostics
//! at well-defined points: just before the script body runs, and when the
//! body fails without being handled. In a headless binary the handler writes
//! a structured report to the log; a custom handler can be plugged into the
//! driver instead.

use std::error::Error as _;

use tracing::{error, info};

use super::{ParsedArguments, ScriptError};

/// Hooks invoked by the driver on entry and on uncaught failure.
pub trait Diagnostics {
    /// Called before the script body when `--pdb` is set.
    fn on_entry(&self, args: &ParsedArguments);

    /// Called with an uncaught error when `--post-mortem` is set. The error
    /// is not propagated afterwards.
    fn on_error(&self, err: &ScriptError);
}

/// Default handler: structured log reports.
#[derive(Debug, Default)]
pub struct CrashReport;

impl Diagnostics for CrashReport {
    fn on_entry(&self, args: &ParsedArguments) {
        let ids: Vec<&str> = args.matches().ids().map(clap::Id::as_str).collect();
        info!(
            arguments = ?ids,
            verbose = args.common().verbose,
            "entry diagnostic requested"
        );
    }

    fn on_error(&self, err: &ScriptError) {
        error!(error = %err, "uncaught failure intercepted");
        let mut source = err.source();
        while let Some(cause) = source {
            error!(cause = %cause, "caused by");
            source = cause.source();
        }
    }
}
