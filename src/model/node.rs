//! Hash tree node

use super::Digest;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A node in the hash tree
///
/// Children keep their enumeration order: the order in which they were
/// attached. The tree builder attaches object properties in sorted order;
/// incremental updates append new keys at the end. That order is what
/// [`DigestOrder::Insertion`](crate::DigestOrder::Insertion) combines over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HashNode {
    digest: Digest,
    /// Digest of the canonical encoding of the value this node mirrors
    fingerprint: Digest,
    children: BTreeMap<String, HashNode>,
    order: Vec<String>,
}

impl HashNode {
    /// Empty placeholder, used before initialization and when a leaf has to
    /// be rebuilt as a structural node
    pub fn placeholder() -> Self {
        HashNode::default()
    }

    /// Primitive or opaque leaf; its fingerprint is its digest
    pub fn leaf(digest: Digest) -> Self {
        HashNode {
            digest,
            fingerprint: digest,
            ..Default::default()
        }
    }

    pub fn digest(&self) -> Digest {
        self.digest
    }

    pub fn fingerprint(&self) -> Digest {
        self.fingerprint
    }

    /// True when this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.is_leaf() && self.digest.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn child(&self, key: &str) -> Option<&HashNode> {
        self.children.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    /// Child keys in enumeration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Children in enumeration order
    pub fn children(&self) -> impl Iterator<Item = (&str, &HashNode)> {
        self.order
            .iter()
            .filter_map(|k| self.children.get(k).map(|node| (k.as_str(), node)))
    }

    /// Children in lexicographic key order
    pub fn sorted_children(&self) -> impl Iterator<Item = (&str, &HashNode)> {
        self.children.iter().map(|(k, node)| (k.as_str(), node))
    }

    /// Resolve a dot-joined path, e.g. `"servers.0.host"`
    ///
    /// The empty path resolves to this node.
    pub fn find(&self, path: &str) -> Option<&HashNode> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    // === Mutation, reserved for the builder and the engine ===

    pub(crate) fn child_mut(&mut self, key: &str) -> Option<&mut HashNode> {
        self.children.get_mut(key)
    }

    /// Attach `node` under `key`; an existing child keeps its position
    pub(crate) fn insert_child(&mut self, key: String, node: HashNode) {
        if !self.children.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.children.insert(key, node);
    }

    pub(crate) fn remove_children(&mut self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        for key in keys {
            self.children.remove(key);
        }
        self.order.retain(|k| self.children.contains_key(k));
    }

    pub(crate) fn set_digest(&mut self, digest: Digest) {
        self.digest = digest;
    }

    pub(crate) fn set_fingerprint(&mut self, fingerprint: Digest) {
        self.fingerprint = fingerprint;
    }
}

impl Serialize for HashNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HashNode", 2)?;
        state.serialize_field("digest", &self.digest)?;
        state.serialize_field("children", &OrderedChildren(self))?;
        state.end()
    }
}

struct OrderedChildren<'a>(&'a HashNode);

impl Serialize for OrderedChildren<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, node) in self.0.children() {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}
