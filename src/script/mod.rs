//! Common command-line script setup.
//!
//! Every utility in this crate is a [`Script`]: it declares its argument
//! schema and implements a `run` body, and the [`Driver`] supplies the rest —
//! the flags every tool shares, verbosity-controlled logging, diagnostic
//! hooks, and exit-status handling. Binaries reduce to a single call to
//! [`main`].

pub mod diagnostics;
pub mod errors;
pub mod interrupt;
pub mod status;

use std::process::ExitCode;

use clap::{ArgAction, ArgMatches, Args as ClapArgs, Command, FromArgMatches};
use tracing::level_filters::LevelFilter;

pub use diagnostics::{CrashReport, Diagnostics};
pub use errors::{INTERRUPT_MESSAGE, ScriptError};
pub use status::ExitStatus;

/// Log levels selected by the repeatable `-v` flag, least verbose first.
pub const LEVELS: [LevelFilter; 3] = [LevelFilter::WARN, LevelFilter::INFO, LevelFilter::DEBUG];

/// Map a verbosity count to a log level. Saturates at the most verbose
/// defined level; over-repetition is never an error.
#[must_use]
pub fn level_for(verbose: u8) -> LevelFilter {
    LEVELS[usize::from(verbose).min(LEVELS.len() - 1)]
}

/// The command-line tokens to parse.
///
/// Either the real process arguments, a single string to be tokenized on
/// whitespace, or an explicit token sequence (the latter two exist for
/// tests and embedding). The first token is always the program name.
#[derive(Debug, Clone, Default)]
pub enum Argv {
    /// Use `std::env::args()`.
    #[default]
    Env,
    /// Tokenize a single string on whitespace.
    Line(String),
    /// Use the tokens as given.
    Tokens(Vec<String>),
}

impl From<&str> for Argv {
    fn from(line: &str) -> Self {
        Self::Line(line.to_owned())
    }
}

impl From<Vec<String>> for Argv {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl Argv {
    fn into_tokens(self) -> Vec<String> {
        match self {
            Self::Env => std::env::args().collect(),
            Self::Line(line) => line.split_whitespace().map(str::to_owned).collect(),
            Self::Tokens(tokens) => tokens,
        }
    }
}

/// Standard options present on every utility.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonFlags {
    /// Increase verbosity. Repeat the option for more verbosity.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit a diagnostic report before running the script body.
    #[arg(long, global = true)]
    pub pdb: bool,

    /// Emit a crash report instead of propagating an uncaught error.
    #[arg(long = "post-mortem", global = true)]
    pub post_mortem: bool,
}

/// The parsed command line: the script's own arguments plus the common flags.
///
/// Read-only after construction and owned by exactly one [`Driver`].
#[derive(Debug, Clone)]
pub struct ParsedArguments {
    matches: ArgMatches,
    common: CommonFlags,
}

impl ParsedArguments {
    /// The raw matches for the script's declared arguments.
    #[must_use]
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// The flags shared by every utility.
    #[must_use]
    pub fn common(&self) -> &CommonFlags {
        &self.common
    }

    /// A required string argument.
    ///
    /// # Errors
    ///
    /// Returns a usage error if the argument is absent, which for an
    /// argument declared `required` means the schema and the lookup id
    /// disagree.
    pub fn required_str(&self, id: &str) -> Result<&str, ScriptError> {
        self.matches
            .get_one::<String>(id)
            .map(String::as_str)
            .ok_or_else(|| {
                clap::Error::raw(
                    clap::error::ErrorKind::MissingRequiredArgument,
                    format!("missing required argument '{id}'\n"),
                )
                .into()
            })
    }

    /// An optional string argument.
    #[must_use]
    pub fn opt_str(&self, id: &str) -> Option<&str> {
        self.matches.get_one::<String>(id).map(String::as_str)
    }

    /// A boolean flag declared by the script.
    #[must_use]
    pub fn flag(&self, id: &str) -> bool {
        self.matches.get_flag(id)
    }
}

/// A standalone utility: an argument schema and a body.
///
/// Both hooks are required; a type that omits one does not compile.
pub trait Script {
    /// Register the script's own argument declarations on the shared parser.
    fn declare_arguments(&self, cmd: Command) -> Command;

    /// The utility's actual work. All parameters arrive via `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] on any failure; the driver decides how it is
    /// reported.
    fn run(&mut self, args: &ParsedArguments) -> Result<ExitStatus, ScriptError>;
}

/// Hosts one [`Script`] for one invocation: parse, configure logging, run.
pub struct Driver<S: Script> {
    script: S,
    args: ParsedArguments,
    level: LevelFilter,
    diagnostics: Box<dyn Diagnostics>,
    exit_status: Option<ExitStatus>,
}

impl<S: Script> Driver<S> {
    /// Build the parser (script declarations first, then the common flags),
    /// parse `argv` against it, and compute the log level from the verbosity
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Usage`] when the command line is malformed.
    pub fn try_new(script: S, argv: Argv) -> Result<Self, ScriptError> {
        let tokens = argv.into_tokens();
        let prog = tokens
            .first()
            .cloned()
            .unwrap_or_else(|| String::from("script"));

        let cmd = Command::new(prog);
        let cmd = script.declare_arguments(cmd);
        let cmd = CommonFlags::augment_args(cmd);

        let matches = cmd.try_get_matches_from(tokens.iter().map(String::as_str))?;
        let common = CommonFlags::from_arg_matches(&matches)?;
        let level = level_for(common.verbose);

        Ok(Self {
            script,
            args: ParsedArguments { matches, common },
            level,
            diagnostics: Box::new(CrashReport),
            exit_status: None,
        })
    }

    /// Replace the default diagnostic handler.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The parsed arguments for this invocation.
    #[must_use]
    pub fn args(&self) -> &ParsedArguments {
        &self.args
    }

    /// The hosted script.
    #[must_use]
    pub fn script(&self) -> &S {
        &self.script
    }

    /// The log level computed from the verbosity count.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        self.level
    }

    /// The result of the last `invoke`, if it completed.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    /// Install the process-wide stderr log sink at the computed level.
    ///
    /// Applied once per invocation; tolerant of a sink installed earlier in
    /// the same process (e.g. by a test harness).
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Execute the script body under the standard policy.
    ///
    /// With `--pdb`, the diagnostic handler runs before the body, and a user
    /// interrupt propagates unchanged (the handler owns the interaction).
    /// Without it, an interrupt is re-raised carrying
    /// [`INTERRUPT_MESSAGE`]. With `--post-mortem`, any other uncaught error
    /// is handed to the diagnostic handler instead of propagating, and the
    /// invocation reports [`ExitStatus::Error`].
    ///
    /// # Errors
    ///
    /// Whatever the body raised and the policy above did not intercept.
    pub fn invoke(&mut self) -> Result<ExitStatus, ScriptError> {
        let pdb = self.args.common.pdb;
        let post_mortem = self.args.common.post_mortem;

        if pdb {
            self.diagnostics.on_entry(&self.args);
        }

        let outcome = match self.script.run(&self.args) {
            Err(err @ ScriptError::Interrupted { .. }) => {
                if pdb {
                    Err(err)
                } else {
                    Err(ScriptError::Interrupted {
                        message: INTERRUPT_MESSAGE.to_owned(),
                    })
                }
            }
            Err(err) if post_mortem => {
                self.diagnostics.on_error(&err);
                Ok(ExitStatus::Error)
            }
            outcome => outcome,
        };

        if let Ok(status) = &outcome {
            self.exit_status = Some(*status);
        }
        outcome
    }
}

/// The whole binary policy: interrupt hook, parse-or-exit, logging, invoke,
/// error-to-exit-code mapping. Each `src/bin/` entry point is one call to
/// this.
pub fn main<S: Script>(script: S) -> ExitCode {
    interrupt::install();

    let mut driver = match Driver::try_new(script, Argv::Env) {
        Ok(driver) => driver,
        Err(ScriptError::Usage(err)) => err.exit(),
        Err(err) => {
            eprintln!("Error: {err}");
            return err.exit_status().into();
        }
    };
    driver.init_logging();

    match driver.invoke() {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_status().into()
        }
    }
}
