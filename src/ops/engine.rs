//! Incremental differencing engine
//!
//! The engine owns one hash tree and keeps it in step with a stream of
//! snapshots. Each `update` walks the tree against the new value:
//!
//! 1. a structural node whose fingerprint still matches the value's encoding
//!    is skipped together with everything beneath it
//! 2. children missing from the value are reported `removed` and dropped
//! 3. surviving children are compared: leaves and opaque values by digest,
//!    containers by recursing
//! 4. keys new in the value are reported `added` and built fresh
//! 5. the node's digest is recombined from its current children
//!
//! Notifications are delivered to the engine's own subscribers while the
//! walk is in progress, so a listener never observes a half-updated digest
//! through the engine.

use super::{Change, ChangeKind, SubscriptionId, Subscribers};
use crate::config::{DigestOrder, EngineConfig};
use crate::hasher::ContentHasher;
use crate::model::{Digest, HashNode, ValueKind};
use crate::tree::TreeBuilder;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// What the most recent update did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    /// Structural subtrees skipped because their encoding was unchanged
    pub pruned: usize,
}

impl UpdateStats {
    /// Number of notifications emitted
    pub fn changes(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

/// Stateful differencing engine
///
/// Calls take `&mut self`, so one engine is driven by one caller at a time.
/// Independent engines share nothing and can live on different threads.
pub struct DiffEngine {
    builder: TreeBuilder,
    config: EngineConfig,
    root: HashNode,
    initialized: bool,
    subscribers: Subscribers,
    last_stats: UpdateStats,
}

impl DiffEngine {
    pub fn new(config: EngineConfig) -> Self {
        DiffEngine {
            builder: TreeBuilder::new(&config),
            config,
            root: HashNode::placeholder(),
            initialized: false,
            subscribers: Subscribers::new(),
            last_stats: UpdateStats::default(),
        }
    }

    /// Use a different hasher for all digests
    ///
    /// Set this before `initialize`; digests from different hashers never
    /// compare equal.
    pub fn with_hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.builder = self.builder.with_hasher(hasher);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current tree (a placeholder until initialized)
    pub fn root(&self) -> &HashNode {
        &self.root
    }

    pub fn digest(&self) -> Digest {
        self.root.digest()
    }

    /// False before the first `initialize` and after a failed `update`
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn last_stats(&self) -> UpdateStats {
        self.last_stats
    }

    /// Register a listener for change notifications
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Change) + Send + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Replace the tree with a fresh build of `value`
    ///
    /// No notifications are emitted. On error the previous tree is kept.
    pub fn initialize(&mut self, value: &Value) -> Result<&HashNode> {
        let root = self.builder.build(value)?;
        if self.initialized {
            info!(old = %self.root.digest().short(), new = %root.digest().short(), "baseline reset");
        }

        self.root = root;
        self.initialized = true;
        self.last_stats = UpdateStats::default();
        debug!(digest = %self.root.digest().short(), "engine initialized");
        Ok(&self.root)
    }

    /// Bring the tree in line with `value`, publishing every change found
    ///
    /// If this fails the tree may be partially updated; the engine then
    /// refuses further updates until `initialize` is called again. With
    /// `serde_json::Value` input and an infallible [`ContentHasher`] no
    /// current path returns an error here, but the contract holds for any
    /// fallible step added to the walk.
    pub fn update(&mut self, value: &Value) -> Result<&HashNode> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }

        let mut pass = UpdatePass {
            builder: &self.builder,
            order: self.config.digest_order,
            subscribers: &mut self.subscribers,
            stats: UpdateStats::default(),
        };
        let outcome = pass.update_entry(&mut self.root, value, "");
        self.last_stats = pass.stats;

        if let Err(e) = outcome {
            self.initialized = false;
            warn!(error = %e, "update failed, engine needs re-initialization");
            return Err(e);
        }

        debug!(
            added = self.last_stats.added,
            removed = self.last_stats.removed,
            modified = self.last_stats.modified,
            pruned = self.last_stats.pruned,
            digest = %self.root.digest().short(),
            "snapshot applied"
        );
        Ok(&self.root)
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for DiffEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffEngine")
            .field("config", &self.config)
            .field("digest", &self.root.digest())
            .field("initialized", &self.initialized)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

/// State for one walk of the tree
struct UpdatePass<'a> {
    builder: &'a TreeBuilder,
    order: DigestOrder,
    subscribers: &'a mut Subscribers,
    stats: UpdateStats,
}

impl UpdatePass<'_> {
    fn emit(&mut self, change: Change) {
        match change.kind {
            ChangeKind::Added => self.stats.added += 1,
            ChangeKind::Removed => self.stats.removed += 1,
            ChangeKind::Modified => self.stats.modified += 1,
        }
        trace!(kind = %change.kind, path = %change.path, "change");
        self.subscribers.publish(&change);
    }

    /// Compare one existing node with its new value
    fn update_entry(&mut self, node: &mut HashNode, value: &Value, path: &str) -> Result<()> {
        let kind = self.builder.classify(value);
        if kind.is_structural() {
            // A leaf cannot be walked; rebuild it from an empty node
            if node.is_leaf() {
                *node = HashNode::placeholder();
            }
            return self.update_node(node, kind, value, path);
        }

        // Primitives and opaque values are atomic
        let digest = self.builder.value_digest(value)?;
        if digest != node.digest() {
            self.emit(Change::modified(path));
            *node = HashNode::leaf(digest);
        }
        Ok(())
    }

    fn update_node(
        &mut self,
        node: &mut HashNode,
        kind: ValueKind<'_>,
        value: &Value,
        path: &str,
    ) -> Result<()> {
        let fingerprint = self.builder.value_digest(value)?;
        if fingerprint == node.fingerprint() {
            self.stats.pruned += 1;
            trace!(path, "unchanged subtree");
            return Ok(());
        }

        let removed: Vec<String> = node
            .keys()
            .filter(|key| !kind.contains(key))
            .map(str::to_string)
            .collect();
        for key in &removed {
            self.emit(Change::removed(join_path(path, key)));
        }
        node.remove_children(&removed);

        let existing: Vec<String> = node.keys().map(str::to_string).collect();
        for key in &existing {
            let (Some(child_value), Some(child)) = (kind.get(key), node.child_mut(key)) else {
                continue;
            };
            self.update_entry(child, child_value, &join_path(path, key))?;
        }

        for (key, child_value) in kind.entries() {
            if node.contains(&key) {
                continue;
            }
            self.emit(Change::added(join_path(path, &key)));
            node.insert_child(key, self.builder.build(child_value)?);
        }

        node.set_digest(self.builder.combine(node, kind, self.order));
        node.set_fingerprint(fingerprint);
        Ok(())
    }
}

/// `key` at the root, `parent.key` below it
fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::CountingHasher;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder(engine: &mut DiffEngine) -> Arc<Mutex<Vec<Change>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        engine.subscribe(move |c| sink.lock().unwrap().push(c.clone()));
        log
    }

    fn drain(log: &Arc<Mutex<Vec<Change>>>) -> Vec<Change> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    /// Initialize with `from`, update with `to`, return what was emitted
    fn changes(from: Value, to: Value) -> Vec<Change> {
        let mut engine = DiffEngine::default();
        let log = recorder(&mut engine);
        engine.initialize(&from).unwrap();
        engine.update(&to).unwrap();
        drain(&log)
    }

    #[test]
    fn test_initialize_emits_nothing() {
        let mut engine = DiffEngine::default();
        let log = recorder(&mut engine);
        let digest = engine.initialize(&json!({"a": 1})).unwrap().digest();

        assert!(drain(&log).is_empty());
        assert_eq!(digest, TreeBuilder::default().build(&json!({"a": 1})).unwrap().digest());
        assert!(engine.is_initialized());
    }

    #[test]
    fn test_update_before_initialize() {
        let mut engine = DiffEngine::default();
        assert!(matches!(engine.update(&json!({})), Err(Error::NotInitialized)));
        assert!(engine.root().is_placeholder());
    }

    #[test]
    fn test_repeated_update_is_noop() {
        let mut engine = DiffEngine::default();
        let log = recorder(&mut engine);
        let v1 = json!({"a": 1, "n": {"k": [1, 2]}});
        let v2 = json!({"a": 2, "n": {"k": [1, 2, 3]}, "z": null});

        engine.initialize(&v1).unwrap();
        engine.update(&v2).unwrap();
        let digest = engine.digest();
        drain(&log);

        engine.update(&v2).unwrap();
        assert!(drain(&log).is_empty());
        assert_eq!(engine.digest(), digest);
        assert_eq!(engine.last_stats().pruned, 1);
    }

    #[test]
    fn test_addition() {
        assert_eq!(
            changes(json!({"a": 1}), json!({"a": 1, "b": 2})),
            vec![Change::added("b")]
        );
    }

    #[test]
    fn test_removal() {
        assert_eq!(
            changes(json!({"a": 1, "b": 2}), json!({"a": 1})),
            vec![Change::removed("b")]
        );
    }

    #[test]
    fn test_modification() {
        assert_eq!(changes(json!({"a": 1}), json!({"a": 2})), vec![Change::modified("a")]);
    }

    #[test]
    fn test_nested_modification() {
        assert_eq!(
            changes(json!({"n": {"k": "v"}}), json!({"n": {"k": "w"}})),
            vec![Change::modified("n.k")]
        );
    }

    #[test]
    fn test_opaque_leaf_is_atomic() {
        assert_eq!(
            changes(
                json!({"s": {"type": "X", "payload": "p1"}}),
                json!({"s": {"type": "X", "payload": "p2"}})
            ),
            vec![Change::modified("s")]
        );
    }

    #[test]
    fn test_array_reorder_is_positional() {
        assert_eq!(
            changes(json!({"xs": [1, 2, 3]}), json!({"xs": [2, 1, 3]})),
            vec![Change::modified("xs.0"), Change::modified("xs.1")]
        );
    }

    #[test]
    fn test_array_grow_and_shrink() {
        assert_eq!(
            changes(json!({"xs": [1]}), json!({"xs": [1, 2, 3]})),
            vec![Change::added("xs.1"), Change::added("xs.2")]
        );
        assert_eq!(
            changes(json!({"xs": [1, 2, 3]}), json!({"xs": [1]})),
            vec![Change::removed("xs.1"), Change::removed("xs.2")]
        );
    }

    #[test]
    fn test_emission_order() {
        let from = json!({"gone": 1, "keep": {"x": 1}, "mod": 1});
        let to = json!({"keep": {"x": 2, "y": 1}, "mod": 2, "new": true});

        assert_eq!(
            changes(from, to),
            vec![
                Change::removed("gone"),
                Change::modified("keep.x"),
                Change::added("keep.y"),
                Change::modified("mod"),
                Change::added("new"),
            ]
        );
    }

    #[test]
    fn test_leaf_becomes_container() {
        let mut engine = DiffEngine::default();
        let log = recorder(&mut engine);
        engine.initialize(&json!({"a": 1})).unwrap();
        engine.update(&json!({"a": {"x": 1}})).unwrap();

        // only the new contents are reported, not the type change at "a"
        assert_eq!(drain(&log), vec![Change::added("a.x")]);
        assert_eq!(engine.root().child("a").unwrap().len(), 1);
    }

    #[test]
    fn test_container_becomes_leaf() {
        let mut engine = DiffEngine::default();
        let log = recorder(&mut engine);
        engine.initialize(&json!({"a": {"x": 1}})).unwrap();
        engine.update(&json!({"a": 5})).unwrap();

        assert_eq!(drain(&log), vec![Change::modified("a")]);
        assert!(engine.root().child("a").unwrap().is_leaf());
    }

    #[test]
    fn test_plain_object_becomes_opaque() {
        assert_eq!(
            changes(json!({"s": {"payload": "p"}}), json!({"s": {"type": "enc", "payload": "p"}})),
            vec![Change::modified("s")]
        );
    }

    #[test]
    fn test_root_leaf() {
        assert_eq!(changes(json!(1), json!(2)), vec![Change::modified("")]);
        assert!(changes(json!("same"), json!("same")).is_empty());
    }

    #[test]
    fn test_pruning_skips_descendants() {
        let hasher = Arc::new(CountingHasher::default());
        let mut engine = DiffEngine::default().with_hasher(hasher.clone());

        let big: serde_json::Map<String, Value> =
            (0..200).map(|i| (format!("k{}", i), json!({"v": i}))).collect();
        engine.initialize(&json!({"big": big, "b": 1})).unwrap();

        hasher.reset();
        engine.update(&json!({"big": big, "b": 1})).unwrap();
        assert_eq!(hasher.calls(), 1, "identical snapshot costs one digest");

        hasher.reset();
        engine.update(&json!({"big": big, "b": 2})).unwrap();
        // root fingerprint, leaf "b", fingerprint of "big", root recombine
        assert_eq!(hasher.calls(), 4);
        assert_eq!(engine.last_stats().pruned, 1);
    }

    #[test]
    fn test_insertion_order_digest_diverges_from_build() {
        let mut engine = DiffEngine::default();
        engine.initialize(&json!({"b": 1})).unwrap();
        engine.update(&json!({"a": 2, "b": 1})).unwrap();

        let fresh = TreeBuilder::default().build(&json!({"a": 2, "b": 1})).unwrap();
        assert_ne!(engine.digest(), fresh.digest());
        assert_eq!(engine.root().keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_sorted_order_digest_matches_build() {
        let config = EngineConfig::default().with_digest_order(DigestOrder::Sorted);
        let mut engine = DiffEngine::new(config.clone());
        engine.initialize(&json!({"b": 1, "n": {"z": 1}})).unwrap();
        let next = json!({"a": 2, "b": 1, "n": {"y": [1], "z": 1}});
        engine.update(&next).unwrap();

        let fresh = TreeBuilder::new(&config).build(&next).unwrap();
        assert_eq!(engine.digest(), fresh.digest());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut engine = DiffEngine::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let id = engine.subscribe(move |c: &Change| sink.lock().unwrap().push(c.clone()));

        engine.initialize(&json!({"a": 1})).unwrap();
        assert!(engine.unsubscribe(id));
        engine.update(&json!({"a": 2})).unwrap();

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(engine.subscriber_count(), 0);
        assert_eq!(engine.last_stats().modified, 1);
    }

    #[test]
    fn test_reinitialize_resets_baseline() {
        let mut engine = DiffEngine::default();
        let log = recorder(&mut engine);
        engine.initialize(&json!({"a": 1})).unwrap();
        engine.initialize(&json!({"a": 2})).unwrap();
        engine.update(&json!({"a": 2})).unwrap();

        assert!(drain(&log).is_empty());
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "0"), "a.0");
    }
}
