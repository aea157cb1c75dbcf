use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Application-wide error type for the slimzip CLI.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found at {0} (run 'slimzip config --init' to create one)")]
    ConfigMissing(PathBuf),

    #[error("Unknown package '{0}'")]
    UnknownPackage(String),

    #[error("Archive not found: {0}")]
    MissingArchive(PathBuf),

    #[error("Manifest not found: {0}")]
    MissingManifest(PathBuf),

    #[error("File not found inside archive: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid JSON in {path}: {reason}")]
    InvalidJson { path: PathBuf, reason: String },

    #[error("Failed to launch '{command}': {source}")]
    InstallLaunch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' exited with {status}")]
    Install { command: String, status: ExitStatus },

    #[error("Failed to launch editor: {0}")]
    Editor(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid folder pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl AppError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AppError::Config(msg.into())
    }

    pub fn invalid_json<S: Into<String>>(path: impl Into<PathBuf>, reason: S) -> Self {
        AppError::InvalidJson { path: path.into(), reason: reason.into() }
    }
}
