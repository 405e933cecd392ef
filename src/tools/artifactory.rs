//! `artifactory-up`: generate upload commands for recently modified files.
//!
//! Walks the big-data test tree and prints one `jfrog rt u` command per file
//! modified within the recency window. The tool prints the commands, it does
//! not run them; the operator reviews and pipes them to a shell.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use clap::{Arg, Command};
use tracing::info;

use super::errors::ToolError;
use super::walk_files;
use crate::script::{ExitStatus, ParsedArguments, Script, ScriptError};

/// Environment variable pointing at the big-data test tree.
pub const BIGDATA_ENV: &str = "TEST_BIGDATA";

/// Default recency window, in days.
pub const DEFAULT_DAYS: i64 = 25;

/// Collect files under `root` modified after `cutoff`. `root` should be
/// absolute so the collected paths are usable in generated commands.
///
/// # Errors
///
/// Fails when the tree cannot be read or the user interrupts.
pub fn recent_files(root: &Path, cutoff: DateTime<Local>) -> Result<Vec<PathBuf>, ToolError> {
    let mut files = Vec::new();
    walk_files(root, &mut |path, meta| {
        let modified = DateTime::<Local>::from(meta.modified()?);
        if modified > cutoff {
            info!(path = %path.display(), %modified, "candidate");
            files.push(path.to_path_buf());
        }
        Ok(())
    })?;
    files.sort();
    Ok(files)
}

/// One `jfrog rt u <source> <target>` line per file, the target being the
/// path relative to `root`.
#[must_use]
pub fn upload_commands(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|file| {
            let target = file.strip_prefix(root).unwrap_or(file);
            format!("jfrog rt u {} {}", file.display(), target.display())
        })
        .collect()
}

/// The `artifactory-up` utility.
#[derive(Debug, Default)]
pub struct ArtifactoryUp;

impl Script for ArtifactoryUp {
    fn declare_arguments(&self, cmd: Command) -> Command {
        cmd.about("Generate artifactory upload commands for recently modified files")
            .arg(
                Arg::new("root")
                    .long("root")
                    .value_name("DIR")
                    .help("Data tree to scan (default: the TEST_BIGDATA environment variable)"),
            )
            .arg(
                Arg::new("days")
                    .long("days")
                    .value_name("N")
                    .value_parser(clap::value_parser!(i64))
                    .default_value("25")
                    .help("Only include files modified within the last N days"),
            )
    }

    fn run(&mut self, args: &ParsedArguments) -> Result<ExitStatus, ScriptError> {
        let root = match args.opt_str("root") {
            Some(root) => PathBuf::from(root),
            None => std::env::var(BIGDATA_ENV)
                .map(PathBuf::from)
                .map_err(|_| ToolError::MissingEnv(BIGDATA_ENV))?,
        };
        let root = std::path::absolute(&root).map_err(ToolError::from)?;
        let days = args
            .matches()
            .get_one::<i64>("days")
            .copied()
            .unwrap_or(DEFAULT_DAYS);

        let cutoff = Local::now() - Duration::days(days);
        let files = recent_files(&root, cutoff)?;
        for command in upload_commands(&root, &files) {
            println!("{command}");
        }
        info!(count = files.len(), days, "upload commands generated");
        Ok(ExitStatus::Success)
    }
}
