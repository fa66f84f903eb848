//! Hashers (feature-gated) and the node hashing interface.

use crate::trie::NodeHash;

/// A content hasher for raw node encodings.
///
/// Proof nodes are indexed by the digest of their encoding, so the hasher
/// must match the one used when the proof was generated. Collision
/// resistance is assumed, not re-verified.
pub trait NodeHasher {
    /// Hash a raw node encoding.
    fn hash_node(data: &[u8]) -> NodeHash;
}

/// Blanket implementation for all implementations of `Digest` with 32 bytes
/// of output.
impl<H: digest::Digest<OutputSize = digest::typenum::U32> + Send + Sync> NodeHasher for H {
    fn hash_node(data: &[u8]) -> NodeHash {
        H::digest(data).into()
    }
}

#[cfg(any(feature = "keccak-hasher", test))]
pub use keccak::KeccakHasher;

/// A node hasher making use of Keccak-256, as used by Ethereum's tries.
#[cfg(any(feature = "keccak-hasher", test))]
pub mod keccak {
    /// A [`NodeHasher`](super::NodeHasher) for Keccak-256.
    pub type KeccakHasher = sha3::Keccak256;
}

#[cfg(feature = "sha2-hasher")]
pub use self::sha2::Sha2Hasher;

/// A node hasher making use of sha2-256.
#[cfg(feature = "sha2-hasher")]
pub mod sha2 {
    /// A [`NodeHasher`](super::NodeHasher) for sha2-256.
    pub type Sha2Hasher = ::sha2::Sha256;
}
