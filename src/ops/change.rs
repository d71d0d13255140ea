//! Change notifications

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change at a path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Path appeared
    Added,
    /// Path disappeared
    Removed,
    /// Leaf or opaque value at path has a different digest
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Removed => write!(f, "removed"),
            ChangeKind::Modified => write!(f, "modified"),
        }
    }
}

/// A single notification: `{"type": "added", "path": "servers.0.host"}`
///
/// Paths are dot-joined property names and array indices. A key that itself
/// contains `.` is not escaped, so such paths are ambiguous.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub path: String,
}

impl Change {
    pub fn added(path: impl Into<String>) -> Self {
        Change {
            kind: ChangeKind::Added,
            path: path.into(),
        }
    }

    pub fn removed(path: impl Into<String>) -> Self {
        Change {
            kind: ChangeKind::Removed,
            path: path.into(),
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        Change {
            kind: ChangeKind::Modified,
            path: path.into(),
        }
    }

    /// Whether the path equals `prefix` or lies beneath it
    pub fn is_under(&self, prefix: &str) -> bool {
        prefix.is_empty()
            || self.path == prefix
            || (self.path.starts_with(prefix) && self.path[prefix.len()..].starts_with('.'))
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sigil = match self.kind {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified => '~',
        };
        write!(f, "{} {}", sigil, self.path)
    }
}

/// Changes collected from one or more updates, in emission order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(changes: Vec<Change>) -> Self {
        ChangeSet { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn added_count(&self) -> usize {
        self.count(ChangeKind::Added)
    }

    pub fn removed_count(&self) -> usize {
        self.count(ChangeKind::Removed)
    }

    pub fn modified_count(&self) -> usize {
        self.count(ChangeKind::Modified)
    }

    /// Changes at or beneath `prefix`
    pub fn under<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes.iter().filter(move |c| c.is_under(prefix))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.path.as_str())
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        ChangeSet::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}
