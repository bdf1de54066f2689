//! Error handling for javelin.
use std::path::PathBuf;

use thiserror::Error;

/// Defines all possible errors that can occur in the launcher.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// Error reading or accessing a configuration file.
    #[error("Failed to read config file: {0}")]
    ConfigReadError(#[from] std::io::Error),

    /// Error parsing YAML configuration.
    #[error("Invalid YAML format: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    /// No candidate runtime survived discovery and filtering.
    #[error(
        "No usable Java runtime found (required major version: {})",
        required.as_deref().unwrap_or("any")
    )]
    NoRuntime {
        /// Major version the locator was asked to match, if any.
        required: Option<String>,
    },

    /// The configured application jar does not exist.
    #[error("Application jar not found at {}", path.display())]
    MissingAppJar {
        /// Resolved path that was checked.
        path: PathBuf,
    },

    /// The configured library directory is absent or holds no jars.
    #[error("Library directory {} is missing or contains no jars", path.display())]
    MissingLibraries {
        /// Resolved path that was checked.
        path: PathBuf,
    },

    /// The launch configuration names no main class to start.
    #[error("No main class configured; set `launch.main_class` in the config file")]
    MissingMainClass,

    /// Error spawning the server process.
    #[error("Failed to start '{executable}': {source}")]
    SpawnError {
        /// The executable that failed to start.
        executable: String,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error while waiting for the server process to terminate.
    #[error("Failed to wait on child process: {0}")]
    WaitError(#[source] std::io::Error),
}

impl LauncherError {
    /// Process exit code to surface for this error. Every fatal launcher
    /// condition maps to `1`; the child's own exit code is reported
    /// separately by the supervisor.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
