//! `mast-get`: retrieve a named JWST product from MAST with token
//! authentication.
//!
//! The token comes from `--token` or the `MAST_API_TOKEN` environment
//! variable. The default output directory is derived from the filename by
//! dropping its last `_` segment, e.g.
//! `jw01410021001_02101_00001_guider1_uncal.fits` lands in
//! `jw01410021001_02101_00001_guider1/`.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, Command};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::errors::ToolError;
use crate::script::{ExitStatus, ParsedArguments, Script, ScriptError};

/// The MAST single-file download endpoint.
pub const DEFAULT_MAST_URL: &str = "https://mast.stsci.edu/api/v0.1/Download/file";

/// Environment variable holding the MAST API token.
pub const TOKEN_ENV: &str = "MAST_API_TOKEN";

/// Everything one download needs.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// The product filename, without any directory components.
    pub filename: String,
    /// Where to write the file; derived from the filename when absent.
    pub output_dir: Option<PathBuf>,
    /// Overwrite an existing output file.
    pub overwrite: bool,
    /// Suppress the progress bar.
    pub quiet: bool,
    /// Explicit API token; falls back to [`TOKEN_ENV`].
    pub token: Option<String>,
    /// The download endpoint.
    pub mast_url: String,
}

impl DownloadRequest {
    /// A request with the default endpoint and no overrides.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            output_dir: None,
            overwrite: false,
            quiet: false,
            token: None,
            mast_url: DEFAULT_MAST_URL.to_owned(),
        }
    }
}

/// The output directory a filename implies: everything before its last `_`
/// segment. A filename with no `_` has no derivable directory and falls back
/// to the current directory.
#[must_use]
pub fn default_output_dir(filename: &str) -> PathBuf {
    match filename.rsplit_once('_') {
        Some((prefix, _)) if !prefix.is_empty() => PathBuf::from(prefix),
        _ => PathBuf::from("."),
    }
}

/// Resolve the API token from an explicit value or the environment.
///
/// # Errors
///
/// Returns [`ToolError::MissingToken`] when neither is available.
pub fn resolve_token(explicit: Option<&str>) -> Result<String, ToolError> {
    if let Some(token) = explicit {
        return Ok(token.to_owned());
    }
    std::env::var(TOKEN_ENV).map_err(|_| ToolError::MissingToken)
}

/// Download the requested product, streaming it to disk. Returns the path of
/// the written file. A failed transfer removes the partial file.
///
/// # Errors
///
/// Fails on a bad filename, a missing token, an unusable output location, an
/// existing file without `overwrite`, or any transfer failure.
pub fn download(req: &DownloadRequest) -> Result<PathBuf, ToolError> {
    if req.filename.contains('/') {
        return Err(ToolError::BadFilename(req.filename.clone()));
    }
    let token = resolve_token(req.token.as_deref())?;

    let outdir = req
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&req.filename));
    if !outdir.exists() {
        fs::create_dir_all(&outdir)?;
    } else if !outdir.is_dir() {
        return Err(ToolError::NotADirectory { path: outdir });
    }

    let outfile = outdir.join(&req.filename);
    if outfile.exists() && !req.overwrite {
        return Err(ToolError::AlreadyExists { path: outfile });
    }

    let uri = format!("mast:JWST/product/{}", req.filename);
    info!(url = %req.mast_url, %uri, "requesting product");
    let mut response = ureq::get(&req.mast_url)
        .query("uri", &uri)
        .header("Authorization", &format!("token {token}"))
        .call()
        .map_err(|source| ToolError::Download {
            url: req.mast_url.clone(),
            source: Box::new(source),
        })?;
    debug!(status = response.status().as_u16(), "response received");

    let total = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    let progress = progress_bar(req.quiet, total);
    let mut reader = progress.wrap_read(response.body_mut().as_reader());
    let mut file = File::create(&outfile)?;
    if let Err(err) = io::copy(&mut reader, &mut file) {
        drop(file);
        let _ = fs::remove_file(&outfile);
        return Err(err.into());
    }
    progress.finish_and_clear();

    Ok(outfile)
}

fn progress_bar(quiet: bool, total: Option<u64>) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    }
}

/// The `mast-get` utility.
#[derive(Debug, Default)]
pub struct MastGet;

impl Script for MastGet {
    fn declare_arguments(&self, cmd: Command) -> Command {
        cmd.about("Retrieve a named JWST file from MAST using token authentication")
            .arg(
                Arg::new("filename")
                    .value_name("FILENAME")
                    .required(true)
                    .help("Product filename, e.g. jw01410021001_02101_00001_guider1_uncal.fits"),
            )
            .arg(
                Arg::new("output-dir")
                    .short('d')
                    .long("output-dir")
                    .value_name("DIR")
                    .help("Output directory (default: derived from the filename; created if absent)"),
            )
            .arg(
                Arg::new("overwrite")
                    .short('o')
                    .long("overwrite")
                    .action(ArgAction::SetTrue)
                    .help("Overwrite an existing output file"),
            )
            .arg(
                Arg::new("quiet")
                    .short('q')
                    .long("quiet")
                    .action(ArgAction::SetTrue)
                    .help("Do not show a progress bar"),
            )
            .arg(
                Arg::new("token")
                    .long("token")
                    .value_name("TOKEN")
                    .help("MAST API token (default: the MAST_API_TOKEN environment variable)"),
            )
            .arg(
                Arg::new("mast-url")
                    .long("mast-url")
                    .value_name("URL")
                    .default_value(DEFAULT_MAST_URL)
                    .help("Download endpoint"),
            )
    }

    fn run(&mut self, args: &ParsedArguments) -> Result<ExitStatus, ScriptError> {
        let request = DownloadRequest {
            filename: args.required_str("filename")?.to_owned(),
            output_dir: args.opt_str("output-dir").map(PathBuf::from),
            overwrite: args.flag("overwrite"),
            quiet: args.flag("quiet"),
            token: args.opt_str("token").map(str::to_owned),
            mast_url: args
                .opt_str("mast-url")
                .unwrap_or(DEFAULT_MAST_URL)
                .to_owned(),
        };

        let outfile = download(&request)?;
        info!(path = %outfile.display(), "download complete");
        println!("{}", outfile.display());
        Ok(ExitStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_dir_drops_last_segment() {
        assert_eq!(
            default_output_dir("jw01410021001_02101_00001_guider1_uncal.fits"),
            PathBuf::from("jw01410021001_02101_00001_guider1")
        );
    }

    #[test]
    fn test_default_output_dir_without_separator() {
        assert_eq!(default_output_dir("plain.fits"), PathBuf::from("."));
    }

    #[test]
    fn test_explicit_token_wins() {
        assert_eq!(resolve_token(Some("sekrit")).unwrap(), "sekrit");
    }

    #[test]
    fn test_filename_may_not_contain_directories() {
        let mut req = DownloadRequest::new("dir/file.fits");
        req.token = Some("tok".to_owned());
        let result = download(&req);
        assert!(matches!(result, Err(ToolError::BadFilename(_))));
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("jw0_uncal.fits");
        fs::write(&existing, b"previous").unwrap();

        let mut req = DownloadRequest::new("jw0_uncal.fits");
        req.token = Some("tok".to_owned());
        req.output_dir = Some(dir.path().to_path_buf());
        let result = download(&req);
        assert!(matches!(result, Err(ToolError::AlreadyExists { .. })));
        // The refusal left the file alone.
        assert_eq!(fs::read(&existing).unwrap(), b"previous");
    }

    #[test]
    fn test_output_location_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();

        let mut req = DownloadRequest::new("jw0_uncal.fits");
        req.token = Some("tok".to_owned());
        req.output_dir = Some(file);
        let result = download(&req);
        assert!(matches!(result, Err(ToolError::NotADirectory { .. })));
    }
}
