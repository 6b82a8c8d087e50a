//! Core error types

use thiserror::Error;

use crate::resolver::ResolveError;
use crate::version::VersionError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to parse YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
