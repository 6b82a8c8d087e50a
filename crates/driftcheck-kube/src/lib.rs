//! Driftcheck Kube - Kubernetes integration for driftcheck
//!
//! This crate provides:
//! - **Live state**: `LiveState` / `LocatorResolver` traits for reading objects
//!   from a cluster, with a kube-rs implementation and an in-memory mock
//! - **Cluster version detection**: read the running version from the cluster
//! - **Drift checker**: the per-target loop resolving manifests, fetching live
//!   state and reporting drift

pub mod checker;
pub mod client;
pub mod error;
pub mod live;
pub mod mock;

pub use checker::{CheckOptions, DriftChecker, ReportSink, RunSummary, TargetOutcome};
pub use client::KubeCluster;
pub use error::{KubeError, Result};
pub use live::{LiveState, LocatorResolver, ResourceLocator};
pub use mock::{MockCluster, OperationCounts};
