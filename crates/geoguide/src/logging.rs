#![forbid(unsafe_code)]

//! Log subscriber setup.
//!
//! The terminal belongs to the guide while it runs, so logs only go to a
//! file. Without one no subscriber is installed and every `tracing` call is
//! a cheap no-op.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where and how to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
    /// Filter directives, e.g. `info,geoguide_core=debug`.
    pub filter: String,
    pub json: bool,
}

#[derive(Debug)]
pub enum LogError {
    /// The filter directives did not parse.
    Filter(String),
    /// The log file could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// Another global subscriber is already installed.
    AlreadyInstalled,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(msg) => write!(f, "invalid log filter: {msg}"),
            Self::Open { path, source } => {
                write!(f, "cannot open log file {}: {source}", path.display())
            }
            Self::AlreadyInstalled => f.write_str("a log subscriber is already installed"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Parse filter directives.
///
/// # Errors
///
/// Returns [`LogError::Filter`] when a directive is malformed.
pub fn env_filter(directives: &str) -> Result<EnvFilter, LogError> {
    EnvFilter::try_new(directives).map_err(|e| LogError::Filter(e.to_string()))
}

fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the global subscriber described by `config`.
///
/// Returns `false` when no file is configured and nothing was installed.
///
/// # Errors
///
/// See [`LogError`].
pub fn init(config: &LogConfig) -> Result<bool, LogError> {
    let Some(path) = &config.file else {
        return Ok(false);
    };
    let filter = env_filter(&config.filter)?;
    let writer = Mutex::new(open_append(path)?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|_| LogError::AlreadyInstalled)?;
    tracing::info!(path = %path.display(), json = config.json, "logging started");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_installs_nothing() {
        let config = LogConfig {
            file: None,
            filter: "not a [valid filter".into(),
            json: false,
        };
        assert!(!init(&config).unwrap());
    }

    #[test]
    fn accepts_target_directives() {
        assert!(env_filter("info,geoguide_core=debug").is_ok());
    }

    #[test]
    fn open_error_names_path() {
        let err = open_append(Path::new("/nonexistent-dir/geoguide.log")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/geoguide.log"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
