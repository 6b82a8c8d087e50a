//! CLI commands

pub mod check;
pub mod compare;

use driftcheck_core::CoreError;
use std::path::Path;

use crate::error::CliError;

/// Map a failure to read a startup input file onto a CLI error
pub(crate) fn input_error(what: &str, path: &Path, err: CoreError) -> CliError {
    match err {
        CoreError::Io(io) => CliError::Io {
            message: format!("cannot read {} {}: {}", what, path.display(), io),
        },
        other => CliError::config(format!("invalid {} {}: {}", what, path.display(), other)),
    }
}
