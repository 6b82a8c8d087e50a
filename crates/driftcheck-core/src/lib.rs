//! Driftcheck Core - versioned default manifests and drift detection
//!
//! This crate provides the synchronous building blocks used by driftcheck:
//! - `Version`: cluster software versions (`major.minor.patch` + suffix)
//! - Manifest resolution: pick the manifest directory matching a cluster
//!   version, falling back to the nearest available one
//! - `Object`: generic resource representation and its identity
//! - Diff engine: missing / extra / changed classification with ignore paths

pub mod delta;
pub mod diff;
pub mod error;
pub mod object;
pub mod resolver;
pub mod target;
pub mod version;

pub use delta::{Change, Delta, IgnoreFilter, PathStep};
pub use diff::{ChangedObject, DriftReport, diff_list, diff_objects};
pub use error::{CoreError, Result};
pub use object::{Object, ObjectMeta, load_manifest};
pub use resolver::{
    Resolution, ResolveError, ResolveFailure, fallback_priority, resolve_manifest, scan_versions,
};
pub use target::{Target, load_targets};
pub use version::{Version, VersionError};
