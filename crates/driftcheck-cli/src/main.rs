//! driftcheck - compare versioned default manifests against a live cluster

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;
mod telemetry;

use display::Palette;

#[derive(Parser)]
#[command(name = "driftcheck")]
#[command(author = "driftcheck contributors")]
#[command(version)]
#[command(about = "Report drift between default manifests and a live cluster", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every target against the cluster
    Check {
        /// Target list (YAML sequence of apiVersion/kind/manifest/ignore)
        #[arg(short, long, env = "DRIFTCHECK_TARGET")]
        target: PathBuf,

        /// Manifest root with one subdirectory per version
        #[arg(short, long, env = "DRIFTCHECK_MANIFEST")]
        manifest: PathBuf,

        /// Kubeconfig file (default: the files listed in $KUBECONFIG, then ~/.kube/config)
        #[arg(long)]
        kubeconfig: Option<PathBuf>,

        /// Kubeconfig context to use
        #[arg(long)]
        context: Option<String>,

        /// Cluster version (detected from the cluster when omitted)
        #[arg(long, env = "DRIFTCHECK_CLUSTER_VERSION")]
        cluster_version: Option<String>,

        /// Use the nearest available version when a manifest is missing
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        fallback: bool,
    },

    /// Compare two manifest files offline
    Compare {
        /// Desired manifest
        desired: PathBuf,

        /// Live manifest
        live: PathBuf,

        /// Field path to leave out of the comparison (repeatable)
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    telemetry::init(cli.debug, !cli.no_color);

    let palette = Palette::for_color(!cli.no_color);

    let result = match cli.command {
        Commands::Check {
            target,
            manifest,
            kubeconfig,
            context,
            cluster_version,
            fallback,
        } => commands::check::run(
            &target,
            &manifest,
            kubeconfig.as_deref(),
            context.as_deref(),
            cluster_version.as_deref(),
            fallback,
            palette,
        ),

        Commands::Compare {
            desired,
            live,
            ignore,
        } => commands::compare::run(&desired, &live, &ignore, palette),
    };

    let code = match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
