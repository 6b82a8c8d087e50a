//! Logging setup
//!
//! Warnings and debug traces go to stderr so stdout carries only the drift
//! report. Priority for the filter:
//! 1. `--debug` flag (debug for driftcheck crates)
//! 2. `RUST_LOG` environment variable
//! 3. Default: warn

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

pub fn init(debug: bool, color: bool) {
    let filter_layer = if debug {
        EnvFilter::new("warn,driftcheck=debug,driftcheck_core=debug,driftcheck_kube=debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(Level::WARN.into())
            .from_env_lossy()
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer(debug, color, std::io::stderr))
        .init();
}

fn fmt_layer<S, W>(debug: bool, color: bool, writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(debug)
        .with_ansi(color)
        .without_time()
}
