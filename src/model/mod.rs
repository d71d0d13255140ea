//! Core data types: digests, hash tree nodes, value classification

mod digest;
mod node;
mod value;

pub use digest::Digest;
pub use node::HashNode;
pub use value::{canonical_bytes, is_truthy, parse_index, ValueKind, DEFAULT_DISCRIMINATOR};
