//! Default BLAKE3 hasher

use super::ContentHasher;
use crate::model::Digest;

/// BLAKE3, the hasher used unless another is configured
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hasher;

impl ContentHasher for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> Digest {
        Digest::of(data)
    }

    fn name(&self) -> &str {
        "blake3"
    }
}
