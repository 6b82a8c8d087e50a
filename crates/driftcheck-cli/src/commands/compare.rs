//! Compare command - diff two manifest files without a cluster

use driftcheck_core::{IgnoreFilter, diff_list, load_manifest};
use std::io;
use std::path::Path;
use std::slice;

use super::input_error;
use crate::display::{Palette, TerminalReporter};
use crate::error::{CliError, Result};

/// Run the compare command
///
/// Both files must hold the same shape: two single objects or two lists.
pub fn run(desired: &Path, live: &Path, ignore: &[String], palette: Palette) -> Result<()> {
    let desired_obj =
        load_manifest(desired).map_err(|e| input_error("manifest", desired, e))?;
    let live_obj = load_manifest(live).map_err(|e| input_error("manifest", live, e))?;
    let filter = IgnoreFilter::new(ignore.iter().cloned());

    let report = match (desired_obj.is_list(), live_obj.is_list()) {
        (true, true) => diff_list(desired_obj.items(), live_obj.items(), &filter),
        // Differing identities surface as one missing and one extra object
        (false, false) => diff_list(
            slice::from_ref(&desired_obj),
            slice::from_ref(&live_obj),
            &filter,
        ),
        _ => {
            return Err(CliError::config_with_help(
                "cannot compare a list with a single object",
                "pass two lists or two single objects",
            ));
        }
    };

    let label = desired
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| desired.display().to_string());

    let mut reporter = TerminalReporter::new(io::stdout(), io::stderr(), palette);
    reporter.print_header(&label);
    reporter.print_report(&report);
    reporter.finish()?;

    Ok(())
}
