//! Per-target drift checking loop
//!
//! Targets are processed strictly in input order. For each one the manifest
//! matching the cluster version is resolved and loaded, live state is read,
//! and the result is handed to a [`ReportSink`]. Any error while checking a
//! target is logged and reported as a skip; it never stops the run.

use driftcheck_core::{
    ChangedObject, DriftReport, IgnoreFilter, Object, Resolution, Target, Version, diff_list,
    diff_objects, load_manifest, resolve_manifest,
};
use std::path::PathBuf;

use crate::error::{KubeError, Result};
use crate::live::{LiveState, LocatorResolver, ResourceLocator};

/// Settings shared by every target of a run
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Directory holding one subdirectory per version
    pub manifest_root: PathBuf,
    /// Version of the cluster being checked
    pub version: Version,
    /// Try other versions when the exact one has no manifest
    pub fallback: bool,
}

/// Receives results as the loop progresses
pub trait ReportSink {
    /// Called before a target is checked
    fn begin_target(&mut self, target: &Target);

    /// A manifest from another version was used
    fn fallback_used(&mut self, target: &Target, resolution: &Resolution);

    /// The target was compared; `report` may be empty
    fn report(&mut self, target: &Target, report: &DriftReport);

    /// The target could not be checked
    fn skipped(&mut self, target: &Target, error: &KubeError);
}

/// Result of checking one target
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub resolution: Resolution,
    pub report: DriftReport,
}

/// Counts for a whole run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub checked: usize,
    pub drifted: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.checked + self.skipped
    }

    /// Generate a human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} target(s) checked, {} with drift, {} skipped",
            self.checked, self.drifted, self.skipped
        )
    }
}

/// Compares versioned default manifests against a cluster
pub struct DriftChecker<C> {
    cluster: C,
    options: CheckOptions,
}

impl<C: LiveState + LocatorResolver> DriftChecker<C> {
    pub fn new(cluster: C, options: CheckOptions) -> Self {
        Self { cluster, options }
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Check every target in order, reporting to `sink`
    pub async fn run(&self, targets: &[Target], sink: &mut impl ReportSink) -> RunSummary {
        let mut summary = RunSummary::default();

        for target in targets {
            sink.begin_target(target);

            match self.check_target(target).await {
                Ok(outcome) => {
                    if outcome.resolution.is_fallback() {
                        sink.fallback_used(target, &outcome.resolution);
                    }
                    summary.checked += 1;
                    if !outcome.report.is_empty() {
                        summary.drifted += 1;
                    }
                    sink.report(target, &outcome.report);
                }
                Err(error) => {
                    tracing::warn!(
                        manifest = %target.manifest.display(),
                        kind = %target.kind,
                        "skipped due to error: {}",
                        error
                    );
                    summary.skipped += 1;
                    sink.skipped(target, &error);
                }
            }
        }

        summary
    }

    /// Resolve, load and compare a single target
    pub async fn check_target(&self, target: &Target) -> Result<TargetOutcome> {
        let resolution = resolve_manifest(
            &self.options.manifest_root,
            &self.options.version,
            &target.manifest,
            self.options.fallback,
        )?;
        let desired = load_manifest(&resolution.path)?;

        let locator = self
            .cluster
            .resolve(&target.api_version, &target.kind)
            .await?;
        let filter = IgnoreFilter::new(target.ignore.iter().cloned());

        let report = if desired.is_list() {
            let live = self.cluster.list(&locator).await?;
            diff_list(desired.items(), &live, &filter)
        } else {
            self.diff_single(&locator, &desired, &filter).await?
        };

        Ok(TargetOutcome { resolution, report })
    }

    async fn diff_single(
        &self,
        locator: &ResourceLocator,
        desired: &Object,
        filter: &IgnoreFilter,
    ) -> Result<DriftReport> {
        let mut report = DriftReport::default();

        match self
            .cluster
            .get(locator, desired.namespace(), desired.name())
            .await
        {
            Ok(live) => {
                if let Some(delta) = diff_objects(desired, &live, filter) {
                    report.changed.push(ChangedObject {
                        identity: desired.identity(),
                        delta,
                    });
                }
            }
            Err(e) if e.is_not_found() => report.missing.push(desired.identity()),
            Err(e) => return Err(e),
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCluster;
    use driftcheck_core::{CoreError, ResolveFailure};
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Records sink calls as text lines
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
    }

    impl ReportSink for RecordingSink {
        fn begin_target(&mut self, target: &Target) {
            self.events.push(format!("# {}", target.label()));
        }

        fn fallback_used(&mut self, _target: &Target, resolution: &Resolution) {
            self.events
                .push(resolution.notice().unwrap_or_default());
        }

        fn report(&mut self, _target: &Target, report: &DriftReport) {
            if report.is_empty() {
                self.events.push("No diff.".to_string());
                return;
            }
            self.events.extend(report.presence_lines());
            self.events
                .extend(report.changed.iter().map(ToString::to_string));
        }

        fn skipped(&mut self, _target: &Target, error: &KubeError) {
            self.events.push(format!("skipped: {}", error));
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn target(api_version: &str, kind: &str, manifest: &str, ignore: &[&str]) -> Target {
        Target {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            manifest: PathBuf::from(manifest),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn checker(root: &TempDir, version: &str, cluster: MockCluster) -> DriftChecker<MockCluster> {
        DriftChecker::new(
            cluster,
            CheckOptions {
                manifest_root: root.path().to_path_buf(),
                version: Version::parse(version).unwrap(),
                fallback: true,
            },
        )
    }

    const DNS: &str = "apiVersion: config.openshift.io/v1
kind: DNS
metadata:
  name: cluster
spec:
  baseDomain: example.com
  replicas: 2
";

    fn dns_live(replicas: u64) -> Object {
        Object::new("config.openshift.io/v1", "DNS", "", "cluster")
            .with_spec(json!({"baseDomain": "example.com", "replicas": replicas}))
    }

    #[tokio::test]
    async fn test_empty_target_list() {
        let root = TempDir::new().unwrap();
        let checker = checker(&root, "4.11.0", MockCluster::new());
        let mut sink = RecordingSink::default();

        let summary = checker.run(&[], &mut sink).await;

        assert!(sink.events.is_empty());
        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test]
    async fn test_single_object_no_diff() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.11.0/dns.yaml", DNS);
        let checker = checker(&root, "4.11.0", MockCluster::new().with_object(dns_live(2)));
        let mut sink = RecordingSink::default();

        let summary = checker
            .run(
                &[target("config.openshift.io/v1", "DNS", "dns.yaml", &[])],
                &mut sink,
            )
            .await;

        assert_eq!(sink.events, vec!["# dns.yaml", "No diff."]);
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.drifted, 0);
    }

    #[tokio::test]
    async fn test_single_object_changed_and_ignored() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.11.0/dns.yaml", DNS);
        let cluster = MockCluster::new().with_object(dns_live(5));
        let checker = checker(&root, "4.11.0", cluster);

        let plain = target("config.openshift.io/v1", "DNS", "dns.yaml", &[]);
        let outcome = checker.check_target(&plain).await.unwrap();
        assert_eq!(outcome.report.changed.len(), 1);
        assert!(outcome.report.changed[0].delta.render().contains("spec.replicas"));

        let ignoring = target(
            "config.openshift.io/v1",
            "DNS",
            "dns.yaml",
            &["spec.replicas"],
        );
        let outcome = checker.check_target(&ignoring).await.unwrap();
        assert!(outcome.report.is_empty());
    }

    #[tokio::test]
    async fn test_single_object_missing_from_cluster() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.11.0/dns.yaml", DNS);
        let cluster = MockCluster::new().with_kind("config.openshift.io/v1", "DNS", false);
        let checker = checker(&root, "4.11.0", cluster);

        let outcome = checker
            .check_target(&target("config.openshift.io/v1", "DNS", "dns.yaml", &[]))
            .await
            .unwrap();

        assert_eq!(
            outcome.report.missing,
            vec!["config.openshift.io/v1 DNS cluster"]
        );
        assert!(outcome.report.changed.is_empty());
    }

    #[tokio::test]
    async fn test_list_target() {
        let root = TempDir::new().unwrap();
        write(
            root.path(),
            "4.11.0/config/maps.yaml",
            "apiVersion: v1
kind: List
items:
  - apiVersion: v1
    kind: ConfigMap
    metadata: {name: a, namespace: openshift-config}
    data: {color: red}
  - apiVersion: v1
    kind: ConfigMap
    metadata: {name: b, namespace: openshift-config}
    data: {color: green}
",
        );
        let cluster = MockCluster::new().with_objects([
            Object::new("v1", "ConfigMap", "openshift-config", "b")
                .with_data(json!({"color": "green"})),
            Object::new("v1", "ConfigMap", "openshift-config", "c")
                .with_data(json!({"color": "blue"})),
        ]);
        let checker = checker(&root, "4.11.0", cluster);
        let mut sink = RecordingSink::default();

        checker
            .run(
                &[target("v1", "ConfigMap", "config/maps.yaml", &[])],
                &mut sink,
            )
            .await;

        assert_eq!(
            sink.events,
            vec![
                "# maps.yaml",
                "- v1 ConfigMap openshift-config/a is not found",
                "+ v1 ConfigMap openshift-config/c is found, but not in default",
            ]
        );
        assert_eq!(checker.cluster().operation_counts().lists, 1);
    }

    #[tokio::test]
    async fn test_fallback_notice_reported() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.10.5/dns.yaml", DNS);
        write(root.path(), "4.11.2/dns.yaml", DNS);
        let checker = checker(&root, "4.11.0", MockCluster::new().with_object(dns_live(2)));
        let mut sink = RecordingSink::default();

        checker
            .run(
                &[target("config.openshift.io/v1", "DNS", "dns.yaml", &[])],
                &mut sink,
            )
            .await;

        assert_eq!(
            sink.events,
            vec!["# dns.yaml", "used 4.11.2 instead of 4.11.0", "No diff."]
        );
    }

    #[tokio::test]
    async fn test_unresolved_target_is_skipped_and_run_continues() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.11.0/dns.yaml", DNS);
        let mut checker = checker(&root, "4.11.0", MockCluster::new().with_object(dns_live(2)));
        checker.options.fallback = false;
        let mut sink = RecordingSink::default();

        let summary = checker
            .run(
                &[
                    target("config.openshift.io/v1", "DNS", "missing.yaml", &[]),
                    target("config.openshift.io/v1", "DNS", "dns.yaml", &[]),
                ],
                &mut sink,
            )
            .await;

        assert_eq!(sink.events.len(), 4);
        assert_eq!(sink.events[0], "# missing.yaml");
        assert!(sink.events[1].starts_with("skipped: manifest"));
        assert_eq!(sink.events[2..], ["# dns.yaml", "No diff."]);
        assert_eq!(
            summary,
            RunSummary {
                checked: 1,
                drifted: 0,
                skipped: 1
            }
        );
    }

    #[tokio::test]
    async fn test_resolution_failure_reason() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.10.0/other.yaml", DNS);
        let checker = checker(&root, "4.11.0", MockCluster::new());

        let err = checker
            .check_target(&target("config.openshift.io/v1", "DNS", "dns.yaml", &[]))
            .await
            .unwrap_err();

        match err {
            KubeError::Core(CoreError::Resolve(e)) => {
                assert_eq!(e.reason, ResolveFailure::Exhausted)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_and_unknown_kind_are_skips() {
        let root = TempDir::new().unwrap();
        write(root.path(), "4.11.0/dns.yaml", DNS);
        write(
            root.path(),
            "4.11.0/proxy.yaml",
            "apiVersion: config.openshift.io/v1\nkind: Proxy\nmetadata:\n  name: cluster\n",
        );
        let cluster = MockCluster::new()
            .with_object(dns_live(2))
            .failing_kind("DNS");
        let checker = checker(&root, "4.11.0", cluster);
        let mut sink = RecordingSink::default();

        let summary = checker
            .run(
                &[
                    target("config.openshift.io/v1", "DNS", "dns.yaml", &[]),
                    target("config.openshift.io/v1", "Proxy", "proxy.yaml", &[]),
                ],
                &mut sink,
            )
            .await;

        assert_eq!(summary.skipped, 2);
        assert!(sink.events[1].starts_with("skipped: transport error"));
        assert!(sink.events[3].starts_with("skipped: unknown resource type"));
    }
}
