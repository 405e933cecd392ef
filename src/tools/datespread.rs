//! `date-spread`: determine the frequency of file dates under a path.
//!
//! Walks a directory tree and counts files per modification date. The
//! counts come back date-sorted and are rendered as a table or, with
//! `--json`, as a date-keyed object.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use clap::{Arg, ArgAction, Command};
use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use tracing::info;

use super::errors::ToolError;
use super::walk_files;
use crate::script::{ExitStatus, ParsedArguments, Script, ScriptError};

/// Count files per modification date under `root`, recursively.
///
/// # Errors
///
/// Returns [`ToolError::Walk`] when a directory cannot be read,
/// [`ToolError::Interrupted`] when the user cancels mid-walk.
pub fn date_spread(root: &Path) -> Result<BTreeMap<NaiveDate, u64>, ToolError> {
    let mut dates = BTreeMap::new();
    walk_files(root, &mut |_path, meta| {
        let day = DateTime::<Local>::from(meta.modified()?).date_naive();
        *dates.entry(day).or_insert(0) += 1;
        Ok(())
    })?;
    Ok(dates)
}

fn write_table(dates: &BTreeMap<NaiveDate, u64>) {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["DATE", "COUNT"]);
    for (day, count) in dates {
        table.add_row([day.to_string(), count.to_string()]);
    }
    println!("{table}");
}

fn write_json(dates: &BTreeMap<NaiveDate, u64>) {
    let keyed: BTreeMap<String, u64> = dates.iter().map(|(d, c)| (d.to_string(), *c)).collect();
    match serde_json::to_string_pretty(&keyed) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("JSON serialization error: {e}"),
    }
}

/// The `date-spread` utility.
#[derive(Debug, Default)]
pub struct DateSpread;

impl Script for DateSpread {
    fn declare_arguments(&self, cmd: Command) -> Command {
        cmd.about("Determine the frequency of file dates under a path")
            .arg(
                Arg::new("path")
                    .value_name("PATH")
                    .required(true)
                    .help("Path to start recursively searching dates of files"),
            )
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Emit the counts as JSON instead of a table"),
            )
    }

    fn run(&mut self, args: &ParsedArguments) -> Result<ExitStatus, ScriptError> {
        let root = PathBuf::from(args.required_str("path")?);
        let dates = date_spread(&root)?;

        if args.flag("json") {
            write_json(&dates);
        } else {
            write_table(&dates);
        }

        let files: u64 = dates.values().sum();
        info!(files, days = dates.len(), "scan complete");
        Ok(ExitStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use super::*;

    #[test]
    fn test_counts_all_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.txt")).unwrap();
        File::create(dir.path().join("b.txt")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/c.txt")).unwrap();

        let dates = date_spread(dir.path()).unwrap();
        let total: u64 = dates.values().sum();
        assert_eq!(total, 3);

        // Everything was just created, so it all lands on today's date.
        let today = Local::now().date_naive();
        assert_eq!(dates.get(&today), Some(&3));
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let dates = date_spread(dir.path()).unwrap();
        assert!(dates.is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = date_spread(Path::new("/nonexistent/toolshed-test"));
        assert!(matches!(result, Err(ToolError::Walk { .. })));
    }
}
