//! Target list: which resources to compare and against which manifest

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// One resource (or list of resources) to check against its default manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub api_version: String,
    pub kind: String,
    /// Manifest path relative to a version directory
    pub manifest: PathBuf,
    /// Dot-separated field paths excluded from comparison
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Target {
    /// Label printed above the target's results (the manifest file name)
    pub fn label(&self) -> String {
        self.manifest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.manifest.display().to_string())
    }
}

/// Load a target list from a YAML file
pub fn load_targets(path: &Path) -> Result<Vec<Target>> {
    let content = std::fs::read_to_string(path)?;
    parse_targets(&content).map_err(|source| CoreError::Yaml {
        path: path.display().to_string(),
        source,
    })
}

fn parse_targets(content: &str) -> std::result::Result<Vec<Target>, serde_yaml::Error> {
    // Empty or comment-only documents mean "no targets"
    if content
        .lines()
        .all(|l| l.trim().is_empty() || l.trim().starts_with('#'))
    {
        return Ok(Vec::new());
    }
    let targets: Option<Vec<Target>> = serde_yaml::from_str(content)?;
    Ok(targets.unwrap_or_default())
}
