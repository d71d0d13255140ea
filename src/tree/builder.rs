//! Snapshot to hash tree

use crate::config::{DigestOrder, EngineConfig};
use crate::hasher::{Blake3Hasher, ContentHasher};
use crate::model::{canonical_bytes, parse_index, Digest, HashNode, ValueKind};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// Builds hash trees and computes the digests the engine compares against
#[derive(Clone)]
pub struct TreeBuilder {
    hasher: Arc<dyn ContentHasher>,
    discriminator: String,
}

impl TreeBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        TreeBuilder {
            hasher: Arc::new(Blake3Hasher),
            discriminator: config.discriminator.clone(),
        }
    }

    /// Use a different hasher
    pub fn with_hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn classify<'v>(&self, value: &'v Value) -> ValueKind<'v> {
        ValueKind::classify(value, &self.discriminator)
    }

    /// Build the full tree for `value`
    pub fn build(&self, value: &Value) -> Result<HashNode> {
        let kind = self.classify(value);
        if !kind.is_structural() {
            return Ok(HashNode::leaf(self.value_digest(value)?));
        }

        let mut node = HashNode::placeholder();
        for (key, child) in kind.entries() {
            node.insert_child(key, self.build(child)?);
        }
        node.set_digest(self.combine(&node, kind, DigestOrder::Sorted));
        node.set_fingerprint(self.value_digest(value)?);
        Ok(node)
    }

    /// Digest of the canonical encoding of `value`
    ///
    /// This is a leaf's digest and a structural node's fingerprint.
    pub fn value_digest(&self, value: &Value) -> Result<Digest> {
        Ok(self.hasher.hash(&canonical_bytes(value)?))
    }

    /// Combine the node's current children into its digest
    ///
    /// Arrays concatenate child digests by index. Objects concatenate
    /// `key:digest` pairs in the given order.
    pub(crate) fn combine(&self, node: &HashNode, kind: ValueKind<'_>, order: DigestOrder) -> Digest {
        let mut buf = String::with_capacity(node.len() * 72);

        match kind {
            ValueKind::Array(_) => {
                let mut indexed: Vec<(usize, &HashNode)> = node
                    .children()
                    .filter_map(|(k, child)| parse_index(k).map(|i| (i, child)))
                    .collect();
                indexed.sort_by_key(|(i, _)| *i);
                for (_, child) in indexed {
                    buf.push_str(&child.digest().to_hex());
                }
            }
            _ => {
                let children: Vec<(&str, &HashNode)> = match order {
                    DigestOrder::Insertion => node.children().collect(),
                    DigestOrder::Sorted => node.sorted_children().collect(),
                };
                for (key, child) in children {
                    buf.push_str(key);
                    buf.push(':');
                    buf.push_str(&child.digest().to_hex());
                }
            }
        }

        self.hasher.hash(buf.as_bytes())
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
