//! The standalone utilities.
//!
//! Each submodule exposes a library core plus a [`Script`](crate::script::Script)
//! implementation; the matching `src/bin/` entry point is one line of glue.

pub mod artifactory;
pub mod datespread;
pub mod errors;
pub mod mast;
pub mod pipup;
pub mod pool;

use std::fs::{self, Metadata};
use std::path::Path;

use errors::ToolError;

use crate::script::interrupt;

/// Depth-first walk over the regular files under `dir`, checking for user
/// interrupts at each directory boundary.
pub(crate) fn walk_files(
    dir: &Path,
    visit: &mut dyn FnMut(&Path, &Metadata) -> Result<(), ToolError>,
) -> Result<(), ToolError> {
    if interrupt::interrupted() {
        return Err(ToolError::Interrupted);
    }
    let entries = fs::read_dir(dir).map_err(|source| ToolError::Walk {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ToolError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_files(&entry.path(), visit)?;
        } else if file_type.is_file() {
            visit(&entry.path(), &entry.metadata()?)?;
        }
    }
    Ok(())
}
