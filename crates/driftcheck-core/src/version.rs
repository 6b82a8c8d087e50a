//! Cluster software versions
//!
//! Manifest directories and cluster versions are named like `4.11.2` or
//! `4.12.0-rc.1`. Only the numeric triple takes part in ordering; the
//! suffix is kept verbatim for display.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)(?s)(.*)$").expect("valid regex"));

/// Error returned when a string is not a `major.minor.patch[suffix]` version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("could not parse version {input:?}")]
    Malformed { input: String },

    #[error("version component out of range in {input:?}")]
    Overflow { input: String },
}

/// A `major.minor.patch` version with a free-form suffix
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Everything after the patch number, e.g. `-rc.1` or `.okd-2023`
    pub suffix: String,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: String::new(),
        }
    }

    /// Parse a version, trimming surrounding whitespace first
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let caps = VERSION_RE
            .captures(input.trim())
            .ok_or_else(|| VersionError::Malformed {
                input: input.to_string(),
            })?;

        let component = |i: usize| {
            caps[i].parse::<u32>().map_err(|_| VersionError::Overflow {
                input: input.to_string(),
            })
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            suffix: caps[4].to_string(),
        })
    }

    /// The numeric triple used for ordering
    pub fn triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}",
            self.major, self.minor, self.patch, self.suffix
        )
    }
}

// Suffix is descriptive only, so equality follows the numeric triple.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}
