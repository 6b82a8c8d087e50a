//! Generic resource representation shared by manifests and live state

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Kind whose payload is its `data` map instead of `spec`
pub const CONFIG_MAP_KIND: &str = "ConfigMap";

/// Name and namespace of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    /// Empty for cluster-scoped resources
    #[serde(default)]
    pub namespace: String,
}

/// A single resource or a list of resources
///
/// Only the fields taking part in drift detection are kept. A list object
/// has `items` set; a singular object carries its payload in `spec` or
/// `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Object {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Object>>,
}

impl Object {
    /// Build a singular object; handy for tests and live-state adapters
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
            },
            ..Default::default()
        }
    }

    pub fn with_spec(mut self, spec: JsonValue) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// Build a list object
    pub fn list(items: Vec<Object>) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "List".to_string(),
            items: Some(items),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn is_list(&self) -> bool {
        self.items.is_some()
    }

    /// Child objects of a list (empty for singular objects)
    pub fn items(&self) -> &[Object] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Join key between desired and live objects
    ///
    /// `<apiVersion> <kind> <name>` or `<apiVersion> <kind> <namespace>/<name>`.
    pub fn identity(&self) -> String {
        self.to_string()
    }

    /// Name of the field compared between desired and live state
    pub fn payload_field(&self) -> &'static str {
        if self.kind == CONFIG_MAP_KIND {
            "data"
        } else {
            "spec"
        }
    }

    /// The compared substructure; absent payloads compare as `null`
    pub fn payload(&self) -> &JsonValue {
        self.field(self.payload_field())
    }

    /// `spec` or `data` by name, `null` when absent or unknown
    pub fn field(&self, name: &str) -> &JsonValue {
        static NULL: JsonValue = JsonValue::Null;
        let value = match name {
            "spec" => &self.spec,
            "data" => &self.data,
            _ => return &NULL,
        };
        value.as_ref().unwrap_or(&NULL)
    }

    /// Convert any JSON document with Kubernetes object shape
    pub fn from_json(value: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.metadata.namespace.is_empty() {
            write!(f, "{} {} {}", self.api_version, self.kind, self.metadata.name)
        } else {
            write!(
                f,
                "{} {} {}/{}",
                self.api_version, self.kind, self.metadata.namespace, self.metadata.name
            )
        }
    }
}

/// Load a manifest file into an [`Object`]
///
/// YAML is read into a JSON value first so numbers keep the same
/// representation as objects returned by the cluster API.
pub fn load_manifest(path: &Path) -> Result<Object> {
    let content = std::fs::read_to_string(path)?;
    let value: JsonValue = serde_yaml::from_str(&content).map_err(|source| CoreError::Yaml {
        path: path.display().to_string(),
        source,
    })?;

    if !value.is_object() {
        return Err(CoreError::InvalidManifest {
            path: path.display().to_string(),
            message: "expected a mapping at the document root".to_string(),
        });
    }

    Object::from_json(value).map_err(|e| CoreError::InvalidManifest {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
