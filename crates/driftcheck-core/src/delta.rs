//! Structural delta between two JSON trees with ignore-path filtering
//!
//! The walk records a [`Change`] at the shallowest path where the desired and
//! live trees disagree. Before descending into a node its path is checked
//! against the ignore filter; an ignored path suppresses the whole subtree.

use serde_json::Value as JsonValue;
use similar::{ChangeTag, TextDiff};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// One step of a traversal path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(k) => write!(f, "{}", k),
            PathStep::Index(i) => write!(f, "{}", i),
        }
    }
}

fn join_path(steps: &[PathStep]) -> String {
    steps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Set of dot-separated paths to exclude from comparison
///
/// Matching is exact string equality on the dot-joined traversal path, no
/// wildcards. A path may be written relative to the compared payload
/// (`replicas`) or prefixed with the payload field (`spec.replicas`).
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    paths: HashSet<String>,
}

impl IgnoreFilter {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the subtree at `steps` below payload field `root` is ignored
    pub fn is_ignored(&self, root: &str, steps: &[PathStep]) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        let relative = join_path(steps);
        let absolute = if relative.is_empty() {
            root.to_string()
        } else {
            format!("{}.{}", root, relative)
        };
        self.paths.contains(&relative) || self.paths.contains(&absolute)
    }
}

/// A disagreement at a single path
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Dot-joined path including the payload field, e.g. `spec.replicas`
    pub path: String,
    /// `None` when the path only exists in the live tree
    pub desired: Option<JsonValue>,
    /// `None` when the path only exists in the desired tree
    pub live: Option<JsonValue>,
}

/// All disagreements between two payloads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub changes: Vec<Change>,
}

impl Delta {
    /// Compare `desired` against `live`, both found under payload field `root`
    pub fn between(
        root: &str,
        desired: &JsonValue,
        live: &JsonValue,
        filter: &IgnoreFilter,
    ) -> Self {
        let mut walker = Walker {
            root,
            filter,
            path: Vec::new(),
            changes: Vec::new(),
        };
        walker.walk(Some(desired), Some(live));
        Self {
            changes: walker.changes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Render as text: one `path:` header per change followed by `-`
    /// (desired) and `+` (live) lines
    pub fn render(&self) -> String {
        let mut output = String::new();

        for change in &self.changes {
            output.push_str(&change.path);
            output.push_str(":\n");

            let old = change.desired.as_ref().map(to_yaml).unwrap_or_default();
            let new = change.live.as_ref().map(to_yaml).unwrap_or_default();

            for line in TextDiff::from_lines(&old, &new).iter_all_changes() {
                let prefix = match line.tag() {
                    ChangeTag::Delete => "  - ",
                    ChangeTag::Insert => "  + ",
                    ChangeTag::Equal => "    ",
                };
                output.push_str(prefix);
                output.push_str(line.value().trim_end());
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn to_yaml(value: &JsonValue) -> String {
    serde_yaml::to_string(value).unwrap_or_else(|_| format!("{}\n", value))
}

struct Walker<'a> {
    root: &'a str,
    filter: &'a IgnoreFilter,
    path: Vec<PathStep>,
    changes: Vec<Change>,
}

impl Walker<'_> {
    fn walk(&mut self, desired: Option<&JsonValue>, live: Option<&JsonValue>) {
        if self.filter.is_ignored(self.root, &self.path) {
            return;
        }

        match (desired, live) {
            (Some(JsonValue::Object(a)), Some(JsonValue::Object(b))) => {
                let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
                for key in keys {
                    self.path.push(PathStep::Key(key.clone()));
                    self.walk(a.get(key), b.get(key));
                    self.path.pop();
                }
            }
            (Some(JsonValue::Array(a)), Some(JsonValue::Array(b))) => {
                for i in 0..a.len().max(b.len()) {
                    self.path.push(PathStep::Index(i));
                    self.walk(a.get(i), b.get(i));
                    self.path.pop();
                }
            }
            (a, b) if a == b => {}
            (a, b) => {
                let relative = join_path(&self.path);
                let path = if relative.is_empty() {
                    self.root.to_string()
                } else {
                    format!("{}.{}", self.root, relative)
                };
                self.changes.push(Change {
                    path,
                    desired: a.cloned(),
                    live: b.cloned(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn none() -> IgnoreFilter {
        IgnoreFilter::default()
    }

    #[test]
    fn test_identical_payloads_have_no_delta() {
        let a = json!({"replicas": 2, "selector": {"app": "web"}, "ports": [80, 443]});
        assert!(Delta::between("spec", &a, &a.clone(), &none()).is_empty());
    }

    #[test]
    fn test_scalar_change_reports_path() {
        let desired = json!({"replicas": 2, "paused": false});
        let live = json!({"replicas": 5, "paused": false});

        let delta = Delta::between("spec", &desired, &live, &none());
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "spec.replicas");
        assert_eq!(delta.changes[0].desired, Some(json!(2)));
        assert_eq!(delta.changes[0].live, Some(json!(5)));
        assert_eq!(delta.render(), "spec.replicas:\n  - 2\n  + 5\n");
    }

    #[test]
    fn test_missing_and_added_keys() {
        let desired = json!({"a": 1, "b": 2});
        let live = json!({"b": 2, "c": 3});

        let delta = Delta::between("data", &desired, &live, &none());
        let paths: Vec<_> = delta.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["data.a", "data.c"]);
        assert_eq!(delta.changes[0].live, None);
        assert_eq!(delta.changes[1].desired, None);
    }

    #[test]
    fn test_array_elements_use_index_steps() {
        let desired = json!({"routes": [{"host": "a"}, {"host": "b"}]});
        let live = json!({"routes": [{"host": "a"}, {"host": "c"}, {"host": "d"}]});

        let delta = Delta::between("spec", &desired, &live, &none());
        let paths: Vec<_> = delta.changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["spec.routes.1.host", "spec.routes.2"]);
    }

    #[test]
    fn test_type_mismatch_is_a_single_change() {
        let desired = json!({"tls": {"enabled": true}});
        let live = json!({"tls": "off"});

        let delta = Delta::between("spec", &desired, &live, &none());
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "spec.tls");
    }

    #[test]
    fn test_ignore_with_payload_prefix() {
        let desired = json!({"replicas": 2, "image": "x"});
        let live = json!({"replicas": 7, "image": "x"});

        let filter = IgnoreFilter::new(["spec.replicas"]);
        assert!(Delta::between("spec", &desired, &live, &filter).is_empty());
    }

    #[test]
    fn test_ignore_relative_to_payload() {
        let desired = json!({"replicas": 2});
        let live = json!({"replicas": 7});

        let filter = IgnoreFilter::new(["replicas"]);
        assert!(Delta::between("spec", &desired, &live, &filter).is_empty());
    }

    #[test]
    fn test_ignore_suppresses_subtree_and_indices() {
        let desired = json!({"tuning": {"a": 1, "b": 2}, "hosts": ["x", "y"]});
        let live = json!({"tuning": {"a": 9}, "hosts": ["x", "z"]});

        let filter = IgnoreFilter::new(["spec.tuning", "spec.hosts.1"]);
        assert!(Delta::between("spec", &desired, &live, &filter).is_empty());
    }

    #[test]
    fn test_ignore_is_exact_not_prefix() {
        let desired = json!({"replicasMax": 2});
        let live = json!({"replicasMax": 3});

        let filter = IgnoreFilter::new(["spec.replicas", "spec.*"]);
        let delta = Delta::between("spec", &desired, &live, &filter);
        assert_eq!(delta.changes.len(), 1);
    }

    #[test]
    fn test_ignore_only_matching_field() {
        let desired = json!({"replicas": 2, "image": "a"});
        let live = json!({"replicas": 7, "image": "b"});

        let filter = IgnoreFilter::new(["spec.replicas"]);
        let delta = Delta::between("spec", &desired, &live, &filter);
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "spec.image");
    }

    #[test]
    fn test_null_versus_object_at_root() {
        let delta = Delta::between("spec", &JsonValue::Null, &json!({"a": 1}), &none());
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "spec");
    }

    #[test]
    fn test_render_nested_value() {
        let desired = json!({"endpoint": {"host": "a.example.com", "port": 443}});
        let live = json!({"endpoint": "disabled"});

        let delta = Delta::between("spec", &desired, &live, &none());
        insta::assert_snapshot!(delta.render(), @r"
        spec.endpoint:
          - host: a.example.com
          - port: 443
          + disabled
        ");
    }
}
