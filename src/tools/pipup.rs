//! `pip-refresh`: update pip-only installed packages in a conda environment.
//!
//! `conda env export` reports the environment as YAML; pip-installed
//! packages appear under a `pip:` block as `name==version` entries. Each of
//! those gets a `pip install -U`.

use clap::{Arg, ArgAction, Command};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::errors::ToolError;
use crate::script::{ExitStatus, ParsedArguments, Script, ScriptError, interrupt};

#[derive(Debug, Deserialize)]
struct CondaEnv {
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Dependency {
    Pip { pip: Vec<String> },
    Conda(serde::de::IgnoredAny),
}

/// Extract the pip-only packages from a `conda env export` dump as
/// `(name, version)` pairs. Entries without a `==` pin (editable installs
/// and the like) are skipped.
///
/// # Errors
///
/// Returns [`ToolError::Yaml`] when the dump is not valid YAML.
pub fn pip_packages(yaml: &str) -> Result<Vec<(String, String)>, ToolError> {
    let env: CondaEnv = serde_yaml::from_str(yaml)?;
    for dep in env.dependencies {
        if let Dependency::Pip { pip } = dep {
            return Ok(pip
                .iter()
                .filter_map(|spec| spec.split_once("=="))
                .map(|(name, version)| (name.to_owned(), version.to_owned()))
                .collect());
        }
    }
    Ok(Vec::new())
}

/// Capture the active environment as YAML.
///
/// # Errors
///
/// Fails when `conda` cannot be spawned or reports failure.
pub fn conda_export() -> Result<String, ToolError> {
    let output = std::process::Command::new("conda")
        .args(["env", "export"])
        .output()
        .map_err(|source| ToolError::CommandSpawn {
            command: "conda env export",
            source,
        })?;
    if !output.status.success() {
        return Err(ToolError::CommandFailed {
            command: "conda env export",
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Update each package in turn. A failed update is logged and the remaining
/// packages are still attempted. With `dry_run`, the pinned specs are
/// printed instead.
///
/// # Errors
///
/// Fails when `pip` cannot be spawned or the user interrupts.
pub fn update_all(packages: &[(String, String)], dry_run: bool) -> Result<(), ToolError> {
    for (name, version) in packages {
        if interrupt::interrupted() {
            return Err(ToolError::Interrupted);
        }
        if dry_run {
            println!("{name}=={version}");
            continue;
        }
        info!(package = %name, installed = %version, "updating");
        let status = std::process::Command::new("pip")
            .args(["install", "-U", name])
            .status()
            .map_err(|source| ToolError::CommandSpawn {
                command: "pip install",
                source,
            })?;
        if !status.success() {
            warn!(package = %name, code = ?status.code(), "update failed");
        }
    }
    Ok(())
}

/// The `pip-refresh` utility.
#[derive(Debug, Default)]
pub struct PipRefresh;

impl Script for PipRefresh {
    fn declare_arguments(&self, cmd: Command) -> Command {
        cmd.about("Update pip installed packages in a conda environment")
            .arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Print the packages that would be updated, without updating"),
            )
    }

    fn run(&mut self, args: &ParsedArguments) -> Result<ExitStatus, ScriptError> {
        let yaml = conda_export()?;
        debug!(bytes = yaml.len(), "environment export captured");

        let packages = pip_packages(&yaml)?;
        if packages.is_empty() {
            info!("No pip dependencies found.");
            return Ok(ExitStatus::Success);
        }
        debug!(count = packages.len(), "pip dependencies found");

        update_all(&packages, args.flag("dry-run"))?;
        Ok(ExitStatus::Success)
    }
}
