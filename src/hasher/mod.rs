//! Pluggable content hashing

mod blake;
mod counting;
mod traits;

pub use blake::Blake3Hasher;
pub use counting::CountingHasher;
pub use traits::ContentHasher;
