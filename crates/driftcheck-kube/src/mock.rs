//! In-memory cluster for testing
//!
//! Serves a fixed set of objects without requiring a Kubernetes cluster.
//! Kinds must be registered before they resolve, mirroring discovery.

use async_trait::async_trait;
use driftcheck_core::Object;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{KubeError, Result};
use crate::live::{LiveState, LocatorResolver, ResourceLocator};

/// In-memory live state for testing
#[derive(Clone, Default)]
pub struct MockCluster {
    /// (apiVersion, kind) -> namespaced
    kinds: HashMap<(String, String), bool>,
    objects: Vec<Object>,
    /// Kinds whose reads fail with a transport error
    failing: HashSet<String>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub resolves: usize,
    pub gets: usize,
    pub lists: usize,
}

impl MockCluster {
    /// Create an empty cluster that serves no kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `kind` under `api_version`
    pub fn with_kind(mut self, api_version: &str, kind: &str, namespaced: bool) -> Self {
        self.kinds
            .insert((api_version.to_string(), kind.to_string()), namespaced);
        self
    }

    /// Add a live object; its kind is registered if not already served
    pub fn with_object(mut self, object: Object) -> Self {
        let namespaced = !object.namespace().is_empty();
        self.kinds
            .entry((object.api_version.clone(), object.kind.clone()))
            .or_insert(namespaced);
        self.objects.push(object);
        self
    }

    pub fn with_objects(self, objects: impl IntoIterator<Item = Object>) -> Self {
        objects.into_iter().fold(self, Self::with_object)
    }

    /// Make every get/list of `kind` fail as if the API were unreachable
    pub fn failing_kind(mut self, kind: &str) -> Self {
        self.failing.insert(kind.to_string());
        self
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    fn count(&self, f: impl FnOnce(&mut OperationCounts)) {
        if let Ok(mut ops) = self.operations.write() {
            f(&mut ops);
        }
    }

    fn check_available(&self, locator: &ResourceLocator) -> Result<()> {
        if self.failing.contains(locator.kind()) {
            return Err(KubeError::Transport(format!(
                "connection refused while reading {}",
                locator.resource.plural
            )));
        }
        Ok(())
    }

    fn of_type<'a>(&'a self, locator: &'a ResourceLocator) -> impl Iterator<Item = &'a Object> {
        self.objects
            .iter()
            .filter(move |o| o.api_version == locator.api_version() && o.kind == locator.kind())
    }
}

#[async_trait]
impl LocatorResolver for MockCluster {
    async fn resolve(&self, api_version: &str, kind: &str) -> Result<ResourceLocator> {
        self.count(|ops| ops.resolves += 1);

        self.kinds
            .get(&(api_version.to_string(), kind.to_string()))
            .map(|namespaced| ResourceLocator::from_type(api_version, kind, *namespaced))
            .ok_or_else(|| KubeError::UnknownResource {
                api_version: api_version.to_string(),
                kind: kind.to_string(),
            })
    }
}

#[async_trait]
impl LiveState for MockCluster {
    async fn get(&self, locator: &ResourceLocator, namespace: &str, name: &str) -> Result<Object> {
        self.count(|ops| ops.gets += 1);
        self.check_available(locator)?;

        self.of_type(locator)
            .find(|o| o.namespace() == namespace && o.name() == name)
            .cloned()
            .ok_or_else(|| KubeError::ObjectNotFound {
                identity: Object::new(locator.api_version(), locator.kind(), namespace, name)
                    .identity(),
            })
    }

    async fn list(&self, locator: &ResourceLocator) -> Result<Vec<Object>> {
        self.count(|ops| ops.lists += 1);
        self.check_available(locator)?;

        Ok(self.of_type(locator).cloned().collect())
    }
}
