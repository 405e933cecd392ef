//! `pool-tools`: merge and inspect association pool files.
//!
//! A pool file is a CSV enumerating observation exposures for a program,
//! named `jwPPPPP_SSS_YYYYMMDDtHHMMSS_pool.csv` (program, sequence,
//! timestamp). The latest pool of a directory is the lexicographically
//! greatest name, i.e. the newest timestamp.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Local;
use clap::{Arg, ArgAction, ArgMatches, Command};
use regex::Regex;
use tracing::{error, info};

use super::errors::ToolError;
use crate::script::{ExitStatus, ParsedArguments, Script, ScriptError, interrupt};

/// File-name suffix identifying a pool.
pub const POOL_SUFFIX: &str = "_pool.csv";

static POOLNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^jw(\d{5})_(\d{3})_(\d{8}[tT]\d{6})_pool\.csv$").expect("pool name pattern")
});

/// A fresh pool-name timestamp, e.g. `20260823t141530`.
#[must_use]
pub fn make_timestamp() -> String {
    Local::now().format("%Y%m%dt%H%M%S").to_string()
}

/// Derive a new pool name from an existing one: same program, the given
/// sequence (or the existing one when `None`), and a fresh timestamp.
///
/// # Errors
///
/// Returns [`ToolError::BadPoolName`] when the existing name does not follow
/// the pool naming convention.
pub fn make_poolname(existing: &Path, seq: Option<&str>) -> Result<String, ToolError> {
    let name = existing
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let caps = POOLNAME_RE
        .captures(name)
        .ok_or_else(|| ToolError::BadPoolName {
            name: name.to_owned(),
        })?;
    let seq = seq.unwrap_or_else(|| caps.get(2).map_or("999", |m| m.as_str()));
    Ok(format!("jw{}_{}_{}_pool.csv", &caps[1], seq, make_timestamp()))
}

/// Find pool files under `dir`, sorted by name. With `latest`, only the
/// newest pool is returned and an empty directory is an error.
///
/// # Errors
///
/// Returns [`ToolError::NoPools`] when `latest` is set and nothing matched.
pub fn find_pools(dir: &Path, latest: bool) -> Result<Vec<PathBuf>, ToolError> {
    let entries = fs::read_dir(dir).map_err(|source| ToolError::Walk {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut pools = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_pool = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(POOL_SUFFIX));
        if is_pool && path.is_file() {
            pools.push(path);
        }
    }
    pools.sort();

    if latest {
        let newest = pools.pop().ok_or_else(|| ToolError::NoPools {
            dir: dir.to_path_buf(),
        })?;
        return Ok(vec![newest]);
    }
    Ok(pools)
}

/// Read one column out of a pool file.
///
/// # Errors
///
/// Returns [`ToolError::NoColumn`] when the header lacks the column.
pub fn pool_column(pool: &Path, column: &str) -> Result<Vec<String>, ToolError> {
    let mut reader = csv::Reader::from_path(pool)?;
    let headers = reader.headers()?.clone();
    let Some(idx) = headers.iter().position(|h| h == column) else {
        return Err(ToolError::NoColumn {
            column: column.to_owned(),
            pool: pool.to_path_buf(),
        });
    };

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        values.push(record.get(idx).unwrap_or_default().to_owned());
    }
    Ok(values)
}

/// Combine every pool under `dir` into one new pool, keeping only the first
/// file's header line. Returns the path of the combined pool.
///
/// # Errors
///
/// Returns [`ToolError::NoPools`] when the directory holds no pools and
/// [`ToolError::BadPoolName`] when the first pool's name cannot seed the
/// combined name.
pub fn pool_combine(dir: &Path, seq: &str) -> Result<PathBuf, ToolError> {
    let pools = find_pools(dir, false)?;
    let first = pools.first().ok_or_else(|| ToolError::NoPools {
        dir: dir.to_path_buf(),
    })?;
    let out_path = dir.join(make_poolname(first, Some(seq))?);

    let mut out = BufWriter::new(File::create(&out_path)?);
    for (index, pool) in pools.iter().enumerate() {
        if interrupt::interrupted() {
            return Err(ToolError::Interrupted);
        }
        let reader = BufReader::new(File::open(pool)?);
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            // Skip the header line of all pools except the first.
            if lineno == 0 && index != 0 {
                continue;
            }
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;
    Ok(out_path)
}

/// Show `column` from the latest (or every) pool under `dir`. A missing
/// column is reported and the remaining pools are still examined, as the
/// column name may only apply to some of them.
fn exam(dir: &Path, column: &str, all: bool) -> Result<(), ToolError> {
    for pool in find_pools(dir, !all)? {
        info!(pool = %pool.display(), "examining pool");
        match pool_column(&pool, column) {
            Ok(values) => {
                for value in values {
                    println!("{value}");
                }
            }
            Err(err @ ToolError::NoColumn { .. }) => error!(error = %err, "column lookup failed"),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Examine the latest pool of every program subdirectory of `path`.
/// Directories without pools are skipped.
fn exam_programs(path: &Path, column: &str) -> Result<(), ToolError> {
    let entries = fs::read_dir(path).map_err(|source| ToolError::Walk {
        path: path.to_path_buf(),
        source,
    })?;
    for entry in entries {
        if interrupt::interrupted() {
            return Err(ToolError::Interrupted);
        }
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir = entry.path();
        info!(program = %dir.display(), "program");
        match exam(&dir, column, false) {
            // No pools, no matter.
            Err(ToolError::NoPools { .. }) => {}
            other => other?,
        }
    }
    Ok(())
}

fn sub_path(sub: &ArgMatches) -> &Path {
    Path::new(sub.get_one::<String>("path").map_or(".", String::as_str))
}

fn sub_column(sub: &ArgMatches) -> &str {
    sub.get_one::<String>("column")
        .map_or("", String::as_str)
}

fn path_arg() -> Arg {
    Arg::new("path")
        .long("path")
        .value_name("DIR")
        .default_value(".")
        .help("Directory holding the pool files")
}

/// The `pool-tools` utility.
#[derive(Debug, Default)]
pub struct PoolTools;

impl Script for PoolTools {
    fn declare_arguments(&self, cmd: Command) -> Command {
        cmd.about("Merge and inspect association pool files")
            .subcommand_required(true)
            .subcommand(
                Command::new("list")
                    .about("List pool files (default: the latest only)")
                    .arg(path_arg())
                    .arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("List every pool, not just the latest"),
                    ),
            )
            .subcommand(
                Command::new("exam")
                    .about("Show a column from pool files")
                    .arg(
                        Arg::new("column")
                            .value_name("COLUMN")
                            .required(true)
                            .help("The column to show"),
                    )
                    .arg(path_arg())
                    .arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Examine every pool, not just the latest"),
                    ),
            )
            .subcommand(
                Command::new("programs")
                    .about("Examine the latest pool of every program directory")
                    .arg(
                        Arg::new("column")
                            .value_name("COLUMN")
                            .required(true)
                            .help("The column to show"),
                    )
                    .arg(path_arg()),
            )
            .subcommand(
                Command::new("combine")
                    .about("Combine all pools into one, keeping a single header")
                    .arg(path_arg())
                    .arg(
                        Arg::new("seq")
                            .long("seq")
                            .value_name("SEQ")
                            .default_value("999")
                            .help("Sequence id for the combined pool name"),
                    ),
            )
    }

    fn run(&mut self, args: &ParsedArguments) -> Result<ExitStatus, ScriptError> {
        match args.matches().subcommand() {
            Some(("list", sub)) => {
                for pool in find_pools(sub_path(sub), !sub.get_flag("all"))? {
                    println!("{}", pool.display());
                }
            }
            Some(("exam", sub)) => {
                exam(sub_path(sub), sub_column(sub), sub.get_flag("all"))?;
            }
            Some(("programs", sub)) => {
                exam_programs(sub_path(sub), sub_column(sub))?;
            }
            Some(("combine", sub)) => {
                let seq = sub.get_one::<String>("seq").map_or("999", String::as_str);
                let out = pool_combine(sub_path(sub), seq)?;
                info!(pool = %out.display(), "combined pool written");
                println!("{}", out.display());
            }
            _ => {
                return Err(clap::Error::raw(
                    clap::error::ErrorKind::MissingSubcommand,
                    "a subcommand is required\n",
                )
                .into());
            }
        }
        Ok(ExitStatus::Success)
    }
}
