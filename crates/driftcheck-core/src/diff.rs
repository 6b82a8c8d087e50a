//! Diff engine: classify desired objects against live objects
//!
//! Objects are joined by [`Object::identity`]. Each desired object is either
//! missing from the live set or compared field by field; live objects never
//! matched by a desired one are reported as extra.

use std::collections::HashMap;
use std::fmt;

use crate::delta::{Delta, IgnoreFilter};
use crate::object::Object;

/// A matched object whose payload differs
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedObject {
    pub identity: String,
    pub delta: Delta,
}

impl fmt::Display for ChangedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.identity, self.delta)
    }
}

/// Drift found for one target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftReport {
    /// Identities present in the desired set but absent from the cluster
    pub missing: Vec<String>,
    /// Identities present in the cluster but absent from the desired set
    pub extra: Vec<String>,
    /// Matched objects whose payload differs, in desired order
    pub changed: Vec<ChangedObject>,
}

impl DriftReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.changed.is_empty()
    }

    /// Presence lines: `- <id> is not found` then `+ <id> is found, but not in default`
    pub fn presence_lines(&self) -> Vec<String> {
        self.missing
            .iter()
            .map(|id| format!("- {} is not found", id))
            .chain(
                self.extra
                    .iter()
                    .map(|id| format!("+ {} is found, but not in default", id)),
            )
            .collect()
    }

    /// Total number of drifted objects
    pub fn drift_count(&self) -> usize {
        self.missing.len() + self.extra.len() + self.changed.len()
    }

    pub(crate) fn record(&mut self, desired: &Object, live: &Object, filter: &IgnoreFilter) {
        if let Some(delta) = diff_objects(desired, live, filter) {
            self.changed.push(ChangedObject {
                identity: desired.identity(),
                delta,
            });
        }
    }
}

/// Compare the payloads of two objects representing the same resource
///
/// The compared field is chosen from the desired object's kind: `data` for
/// ConfigMaps, `spec` for everything else. Returns `None` when no
/// difference survives the ignore filter.
pub fn diff_objects(desired: &Object, live: &Object, filter: &IgnoreFilter) -> Option<Delta> {
    let field = desired.payload_field();
    let delta = Delta::between(field, desired.field(field), live.field(field), filter);
    if delta.is_empty() { None } else { Some(delta) }
}

/// Compare a desired list against the live collection
///
/// `missing` and `changed` follow the order of `desired`; `extra` is sorted
/// by identity. When several live objects share an identity the last one
/// wins.
pub fn diff_list(desired: &[Object], live: &[Object], filter: &IgnoreFilter) -> DriftReport {
    let mut by_identity: HashMap<String, &Object> = HashMap::with_capacity(live.len());
    let mut seen: HashMap<String, bool> = HashMap::with_capacity(live.len());

    for obj in live {
        let identity = obj.identity();
        if by_identity.insert(identity.clone(), obj).is_some() {
            tracing::warn!(identity = %identity, "duplicate live object identity, using the last one");
        }
        seen.insert(identity, false);
    }

    let mut report = DriftReport::default();

    for want in desired {
        let identity = want.identity();
        match by_identity.get(&identity) {
            None => report.missing.push(identity),
            Some(have) => {
                seen.insert(identity, true);
                report.record(want, have, filter);
            }
        }
    }

    report.extra = seen
        .into_iter()
        .filter_map(|(identity, matched)| (!matched).then_some(identity))
        .collect();
    report.extra.sort();

    report
}
