//! Check command - compare default manifests against a live cluster

use driftcheck_core::{Target, Version, load_targets};
use driftcheck_kube::{CheckOptions, DriftChecker, KubeCluster, KubeError};
use std::io;
use std::path::Path;

use super::input_error;
use crate::display::{Palette, TerminalReporter};
use crate::error::{CliError, Result};

/// Run the check command
pub fn run(
    target: &Path,
    manifest: &Path,
    kubeconfig: Option<&Path>,
    context: Option<&str>,
    cluster_version: Option<&str>,
    fallback: bool,
    palette: Palette,
) -> Result<()> {
    let requested = cluster_version.map(parse_version).transpose()?;

    if !manifest.is_dir() {
        return Err(CliError::config_with_help(
            format!("manifest directory {} does not exist", manifest.display()),
            "--manifest must point at a directory with one subdirectory per version",
        ));
    }

    let targets = load_targets(target).map_err(|e| input_error("target list", target, e))?;
    if targets.is_empty() {
        tracing::debug!(path = %target.display(), "target list is empty");
        return Ok(());
    }

    // Targets are checked one after another; no worker threads needed
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("failed to start async runtime: {}", e)))?;

    runtime.block_on(check_cluster(
        &targets,
        manifest,
        kubeconfig,
        context,
        requested,
        fallback,
        palette,
    ))
}

async fn check_cluster(
    targets: &[Target],
    manifest: &Path,
    kubeconfig: Option<&Path>,
    context: Option<&str>,
    requested: Option<Version>,
    fallback: bool,
    palette: Palette,
) -> Result<()> {
    let cluster = KubeCluster::connect(kubeconfig, context.map(str::to_string))
        .await
        .map_err(connect_error)?;

    let version = match requested {
        Some(version) => version,
        None => cluster.cluster_version().await.map_err(|e| {
            CliError::cluster(
                format!("cannot detect cluster version: {}", e),
                "pass --cluster-version explicitly",
            )
        })?,
    };
    tracing::debug!(%version, fallback, "checking targets");

    let checker = DriftChecker::new(
        cluster,
        CheckOptions {
            manifest_root: manifest.to_path_buf(),
            version,
            fallback,
        },
    );

    let mut reporter = TerminalReporter::new(io::stdout(), io::stderr(), palette);
    let summary = checker.run(targets, &mut reporter).await;
    reporter.print_summary(&summary);
    reporter.finish()?;

    Ok(())
}

fn parse_version(raw: &str) -> Result<Version> {
    Version::parse(raw).map_err(|e| {
        CliError::config_with_help(
            format!("invalid --cluster-version: {}", e),
            "expected <major>.<minor>.<patch>, optionally followed by a suffix such as -rc.1",
        )
    })
}

fn connect_error(err: KubeError) -> CliError {
    match err {
        KubeError::Kubeconfig(e) => CliError::config_with_help(
            format!("cannot load kubeconfig: {}", e),
            "pass --kubeconfig or set KUBECONFIG",
        ),
        other => CliError::cluster(
            format!("cannot connect to cluster: {}", other),
            "check that the API server in the selected context is reachable",
        ),
    }
}
