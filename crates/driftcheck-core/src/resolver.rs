//! Version-aware manifest resolution
//!
//! Default manifests live under `<root>/<version>/<relative path>`. When the
//! directory for the cluster's exact version does not carry a manifest, the
//! nearest newer version is preferred over the nearest older one.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::error::Result;
use crate::version::Version;

/// Why a manifest could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveFailure {
    /// Absent for the requested version and fallback is disabled
    NotFound,
    /// Absent for the requested version and every fallback candidate
    Exhausted,
    /// The relative path climbs out of the version directory with `..`
    OutsideRoot,
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveFailure::NotFound => write!(f, "not found"),
            ResolveFailure::Exhausted => write!(f, "no fallback version provides it"),
            ResolveFailure::OutsideRoot => write!(f, "path leaves the manifest root"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("manifest {path} for version {version}: {reason}")]
pub struct ResolveError {
    /// Path that was looked up for the requested version
    pub path: PathBuf,
    pub version: Version,
    pub reason: ResolveFailure,
}

/// A manifest path that exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub path: PathBuf,
    /// Version whose directory provided the manifest
    pub used: Version,
    /// Requested version, when `used` is a fallback
    pub requested: Option<Version>,
}

impl Resolution {
    /// `used <candidate> instead of <target>` when a fallback was taken
    pub fn notice(&self) -> Option<String> {
        self.requested
            .as_ref()
            .map(|requested| format!("used {} instead of {}", self.used, requested))
    }

    pub fn is_fallback(&self) -> bool {
        self.requested.is_some()
    }
}

/// List the version directories under `root`, sorted ascending
///
/// Entries whose names are not versions are skipped with a warning.
pub fn scan_versions(root: &Path) -> Result<Vec<Version>> {
    let mut versions = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        match Version::parse(&name) {
            Ok(version) => versions.push(version),
            Err(_) => {
                tracing::warn!(
                    directory = %name,
                    "directory name is not a version, ignoring"
                );
            }
        }
    }

    versions.sort();
    Ok(versions)
}

/// Order `available` by fallback preference for `target`
///
/// Versions `>= target` come first in ascending order, then versions
/// `< target` in descending order. `available` must be sorted ascending.
pub fn fallback_priority(target: &Version, available: &[Version]) -> Vec<Version> {
    let idx = available.partition_point(|v| v < target);

    available[idx..]
        .iter()
        .chain(available[..idx].iter().rev())
        .cloned()
        .collect()
}

/// Find the manifest for `relative` matching `target`
///
/// `relative` always lands under `<root>/<version>`: a leading `/` is
/// dropped, and `..` components are rejected.
pub fn resolve_manifest(
    root: &Path,
    target: &Version,
    relative: &Path,
    fallback: bool,
) -> Result<Resolution> {
    let Some(relative) = within_version_dir(relative) else {
        return Err(ResolveError {
            path: relative.to_path_buf(),
            version: target.clone(),
            reason: ResolveFailure::OutsideRoot,
        }
        .into());
    };
    let relative = relative.as_path();

    let path = root.join(target.to_string()).join(relative);
    if path.exists() {
        return Ok(Resolution {
            path,
            used: target.clone(),
            requested: None,
        });
    }

    if !fallback {
        return Err(ResolveError {
            path,
            version: target.clone(),
            reason: ResolveFailure::NotFound,
        }
        .into());
    }

    let available = scan_versions(root)?;
    for candidate in fallback_priority(target, &available) {
        let candidate_path = root.join(candidate.to_string()).join(relative);
        if candidate_path.exists() {
            let resolution = Resolution {
                path: candidate_path,
                used: candidate,
                requested: Some(target.clone()),
            };
            if let Some(notice) = resolution.notice() {
                tracing::info!(manifest = %relative.display(), "{}", notice);
            }
            return Ok(resolution);
        }
    }

    Err(ResolveError {
        path,
        version: target.clone(),
        reason: ResolveFailure::Exhausted,
    }
    .into())
}

/// Keep only the normal components of `relative`; `None` on `..` or when
/// nothing is left
fn within_version_dir(relative: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            Component::ParentDir => return None,
        }
    }
    (!clean.as_os_str().is_empty()).then_some(clean)
}
