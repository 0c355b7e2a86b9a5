// SPDX-License-Identifier: MIT
//
// Log setup.
//
// The terminal belongs to the editor, so logs never go to stdout or
// stderr. With `--log-file` they go to that file through
// `tracing-appender`; without it no subscriber is installed and the
// `tracing` macros cost next to nothing. The filter comes from `KILO_LOG`
// (EnvFilter syntax) and defaults to `info`.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const FILTER_ENV: &str = "KILO_LOG";

/// Failure to set up logging.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The path has no file name component.
    #[error("log file {}: not a file path", .0.display())]
    NotAFile(PathBuf),

    /// The appender could not create or open the file.
    #[error("log file {}: {source}", .path.display())]
    Appender {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    /// A global subscriber was already installed.
    #[error("logging already initialised")]
    AlreadyInitialised,
}

/// Split a log path into the directory and file name the appender wants.
///
/// A bare file name logs into the current directory.
fn split_path(path: &Path) -> Result<(PathBuf, String), LogError> {
    let name = path
        .file_name()
        .ok_or_else(|| LogError::NotAFile(path.to_path_buf()))?
        .to_string_lossy()
        .into_owned();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name))
}

/// Filter from [`FILTER_ENV`], or `info` if unset or invalid.
fn filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the file logger if a path was given.
///
/// # Errors
///
/// Returns a [`LogError`] if the file cannot be opened or a subscriber is
/// already installed.
pub fn init(log_file: Option<&Path>) -> Result<(), LogError> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let (dir, name) = split_path(path)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .map_err(|source| LogError::Appender {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LogError::AlreadyInitialised)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kilo starting");
    Ok(())
}
