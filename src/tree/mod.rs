//! Hash tree construction
//!
//! The builder turns a snapshot into a [`HashNode`](crate::HashNode) tree in
//! one pass, with no state of its own beyond the hasher and discriminator.
//! - leaves hash their canonical encoding
//! - arrays combine child digests by position
//! - objects combine `key:digest` pairs in sorted key order

mod builder;

pub use builder::TreeBuilder;
