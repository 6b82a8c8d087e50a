//! Error types for driftcheck-kube

use driftcheck_core::{CoreError, VersionError};
use thiserror::Error;

/// Result type for driftcheck-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while reading cluster state or checking a target
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Object absent from the cluster
    #[error("{identity} not found in cluster")]
    ObjectNotFound { identity: String },

    /// apiVersion/kind not served by the cluster
    #[error("unknown resource type: {api_version}/{kind}")]
    UnknownResource { api_version: String, kind: String },

    /// Cluster unreachable or request failed before a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Kubeconfig could not be read or used
    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Cluster version could not be determined
    #[error("cannot determine cluster version: {0}")]
    ClusterVersion(String),

    /// Cluster reported a version that does not parse
    #[error("invalid cluster version: {0}")]
    InvalidClusterVersion(#[from] VersionError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Manifest resolution or loading error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Check if this is a "not found" signal, either ours or an API 404
    pub fn is_not_found(&self) -> bool {
        match self {
            KubeError::ObjectNotFound { .. } => true,
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }
}
