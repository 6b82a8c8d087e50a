//! Collaborators for reading live cluster state

use async_trait::async_trait;
use driftcheck_core::Object;
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;

use crate::error::Result;

/// Addressable collection endpoint for an apiVersion/kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    pub resource: ApiResource,
    /// Whether objects of this kind live in namespaces
    pub namespaced: bool,
}

impl ResourceLocator {
    /// Build a locator without discovery, guessing the plural from the kind
    pub fn from_type(api_version: &str, kind: &str, namespaced: bool) -> Self {
        Self {
            resource: ApiResource::from_gvk(&gvk_from_api_version(api_version, kind)),
            namespaced,
        }
    }

    pub fn api_version(&self) -> &str {
        &self.resource.api_version
    }

    pub fn kind(&self) -> &str {
        &self.resource.kind
    }
}

/// Split `apiVersion` into group and version
///
/// - "apps/v1" -> group="apps", version="v1"
/// - "v1" -> group="", version="v1" (core API)
pub fn gvk_from_api_version(api_version: &str, kind: &str) -> GroupVersionKind {
    let (group, version) = match api_version.rsplit_once('/') {
        Some((g, v)) => (g, v),
        None => ("", api_version),
    };
    GroupVersionKind::gvk(group, version, kind)
}

/// Maps an apiVersion/kind pair to its collection endpoint
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait LocatorResolver: Send + Sync {
    async fn resolve(&self, api_version: &str, kind: &str) -> Result<ResourceLocator>;
}

/// Read-only access to objects in a cluster
#[async_trait]
pub trait LiveState: Send + Sync {
    /// Fetch one object; a missing object yields an error for which
    /// [`KubeError::is_not_found`](crate::KubeError::is_not_found) is true
    async fn get(&self, locator: &ResourceLocator, namespace: &str, name: &str) -> Result<Object>;

    /// List every object of the locator's kind across all namespaces
    async fn list(&self, locator: &ResourceLocator) -> Result<Vec<Object>>;
}
