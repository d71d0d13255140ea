//! Content hasher trait definition

use crate::model::Digest;

/// Turns bytes into a [`Digest`]
///
/// Every digest the tree builder and the engine compute goes through exactly
/// one `hash` call, so wrapping an implementation is enough to observe how
/// much work an update performs.
pub trait ContentHasher: Send + Sync {
    /// Digest of the given bytes
    fn hash(&self, data: &[u8]) -> Digest;

    /// Get the algorithm name
    fn name(&self) -> &str;
}
