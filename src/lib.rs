//! # snapdiff
//!
//! Incremental change detection for nested JSON-like snapshots.
//!
//! snapdiff keeps a hash tree of the last snapshot it saw. When a new
//! snapshot arrives, subtrees whose encoding has not changed are skipped
//! after a single digest, and everything else is walked to produce
//! `added`/`removed`/`modified` notifications at dotted paths. The tree is
//! patched in place, so the next comparison is just as cheap.
//!
//! ## Core Concepts
//!
//! - **HashNode**: a digest plus ordered children (object keys or array
//!   indices)
//! - **Opaque leaves**: objects tagged with a truthy discriminator field
//!   (`"type"` by default) are compared as a whole, never walked
//! - **TreeBuilder**: snapshot -> hash tree, no state
//! - **DiffEngine**: owns a tree, applies snapshots, publishes changes
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use snapdiff::{Change, DiffEngine};
//! use std::sync::mpsc;
//!
//! let mut engine = DiffEngine::default();
//! let (tx, rx) = mpsc::channel();
//! engine.subscribe(move |change: &Change| {
//!     let _ = tx.send(change.clone());
//! });
//!
//! engine.initialize(&json!({"server": {"port": 80}})).unwrap();
//! engine.update(&json!({"server": {"port": 8080}})).unwrap();
//!
//! assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![Change::modified("server.port")]);
//! ```

pub mod config;
pub mod hasher;
pub mod logging;
pub mod model;
pub mod ops;
pub mod tree;

mod error;

pub use config::{DigestOrder, EngineConfig};
pub use error::{Error, Result};
pub use hasher::{Blake3Hasher, ContentHasher, CountingHasher};
pub use model::{Digest, HashNode, ValueKind};
pub use ops::{Change, ChangeKind, ChangeSet, DiffEngine, SubscriptionId, UpdateStats};
pub use tree::TreeBuilder;
