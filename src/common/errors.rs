use std::path::PathBuf;

use thiserror::Error;

/// Error types for a backup run.
/// We use `anyhow` at the top level for CLI error handling,
/// but these typed errors let the job decide what is fatal.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Configuration file is missing
    #[error("Config file not found: '{}'. Run `wsl2-backup config init` to create one", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration file is unreadable or invalid
    #[error("Config error in '{}': {}", path.display(), message)]
    ConfigError { path: PathBuf, message: String },

    /// The instance enumeration command could not be run
    #[error("Failed to enumerate WSL instances: {message}")]
    Enumeration { message: String },

    /// Enumeration succeeded but returned nothing to back up
    #[error("No WSL instances found, nothing to back up")]
    NoInstances,

    /// `wsl --shutdown` failed
    #[error("Failed to shut down WSL: {message}")]
    Shutdown { message: String },

    /// File system operation failed
    #[error("I/O error at '{}': {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Non-fatal conditions raised by a single prune pass.
#[derive(Debug, Error)]
pub enum RetentionError {
    /// Age-based pruning below one day would delete everything
    #[error("Invalid retention age: {days} days (must be at least 1)")]
    InvalidMaxAge { days: i64 },

    /// Retention directory does not exist
    #[error("Path not found: '{}'", path.display())]
    PathNotFound { path: PathBuf },

    /// File name pattern is not a valid glob
    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Directory listing failed
    #[error("Failed to list '{}': {}", path.display(), source)]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
