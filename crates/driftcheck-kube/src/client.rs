//! kube-rs backed access to a live cluster

use async_trait::async_trait;
use driftcheck_core::{Object, Version};
use kube::{
    Client, Config,
    api::{Api, DynamicObject, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
    core::GroupVersionKind,
    discovery::{ApiResource, Discovery, Scope},
};
use std::path::Path;

use crate::error::{KubeError, Result};
use crate::live::{LiveState, LocatorResolver, ResourceLocator, gvk_from_api_version};

/// Name of the cluster-scoped object carrying the cluster version
const CLUSTER_VERSION_NAME: &str = "version";

/// Connection to a cluster with cached API discovery
pub struct KubeCluster {
    client: Client,
    discovery: Discovery,
}

impl KubeCluster {
    /// Connect using a kubeconfig file, or the default lookup when `None`
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<String>) -> Result<Self> {
        let kubeconfig = match kubeconfig {
            Some(path) => Kubeconfig::read_from(path)?,
            None => Kubeconfig::read()?,
        };

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context,
                ..Default::default()
            },
        )
        .await?;

        let client = Client::try_from(config)?;
        Self::with_client(client).await
    }

    /// Build from an existing client, running discovery once
    pub async fn with_client(client: Client) -> Result<Self> {
        let discovery = Discovery::new(client.clone()).run().await?;
        tracing::debug!("API discovery complete");
        Ok(Self { client, discovery })
    }

    /// Get the underlying Kubernetes client
    pub fn kube_client(&self) -> &Client {
        &self.client
    }

    /// Read the desired version from the `ClusterVersion` object
    pub async fn cluster_version(&self) -> Result<Version> {
        let gvk = GroupVersionKind::gvk("config.openshift.io", "v1", "ClusterVersion");
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ApiResource::from_gvk(&gvk));

        let cv = api.get(CLUSTER_VERSION_NAME).await?;
        let raw = cv
            .data
            .pointer("/status/desired/version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                KubeError::ClusterVersion("status.desired.version is not set".to_string())
            })?;

        tracing::debug!(version = raw, "detected cluster version");
        Ok(Version::parse(raw)?)
    }

    fn api(&self, locator: &ResourceLocator, namespace: &str) -> Api<DynamicObject> {
        if namespace.is_empty() {
            Api::all_with(self.client.clone(), &locator.resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &locator.resource)
        }
    }
}

#[async_trait]
impl LocatorResolver for KubeCluster {
    async fn resolve(&self, api_version: &str, kind: &str) -> Result<ResourceLocator> {
        let gvk = gvk_from_api_version(api_version, kind);
        let (resource, capabilities) =
            self.discovery
                .resolve_gvk(&gvk)
                .ok_or_else(|| KubeError::UnknownResource {
                    api_version: api_version.to_string(),
                    kind: kind.to_string(),
                })?;

        Ok(ResourceLocator {
            resource,
            namespaced: capabilities.scope == Scope::Namespaced,
        })
    }
}

#[async_trait]
impl LiveState for KubeCluster {
    async fn get(&self, locator: &ResourceLocator, namespace: &str, name: &str) -> Result<Object> {
        let obj = self.api(locator, namespace).get(name).await?;
        to_object(obj, &locator.resource)
    }

    async fn list(&self, locator: &ResourceLocator) -> Result<Vec<Object>> {
        let list = Api::<DynamicObject>::all_with(self.client.clone(), &locator.resource)
            .list(&ListParams::default())
            .await?;

        list.items
            .into_iter()
            .map(|obj| to_object(obj, &locator.resource))
            .collect()
    }
}

/// Convert a dynamic API object, filling in type information that list
/// responses leave out of their items
fn to_object(obj: DynamicObject, resource: &ApiResource) -> Result<Object> {
    let mut object = Object::from_json(serde_json::to_value(&obj)?)?;
    if object.api_version.is_empty() {
        object.api_version = resource.api_version.clone();
    }
    if object.kind.is_empty() {
        object.kind = resource.kind.clone();
    }
    Ok(object)
}
