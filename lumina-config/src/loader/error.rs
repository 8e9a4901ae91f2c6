use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems. Raised while resolving options at startup
/// and by the few operations that write state back.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file missing: {path}")]
    MissingFile { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value '{value}' for '{key}', expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("{name} path {path} is not usable")]
    RootUnavailable {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
    #[error("settings cannot be changed in read-only mode")]
    ReadOnly,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("settings could not be serialized")]
    SettingsFormat(#[source] serde_yaml::Error),
    #[error("configuration is closed")]
    Closed,
    #[error(transparent)]
    Path(#[from] PathError),
}

impl ConfigError {
    pub(crate) fn invalid(
        key: &str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.into(),
            expected,
        }
    }
}

/// A derived path could not be created or written. Reported to the caller
/// that needed the path; never fatal for the whole configuration.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PathError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            PathError::Create { path, .. } | PathError::Write { path, .. } => {
                path
            }
        }
    }
}
