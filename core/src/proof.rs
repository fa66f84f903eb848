//! Proof node tables and the traversal state machine.
//!
//! Verification walks from the root toward the lookup key's position,
//! decoding one node at a time and consuming key nibbles as it goes. Every
//! hashed reference followed along the way must resolve against the supplied
//! proof set; a reference the prover did not furnish fails the call rather
//! than being treated as absence. A clean `None` therefore means the key is
//! provably not in the trie, while an error means the proof cannot be
//! trusted or parsed.
//!
//! The traversal is an explicit bounded loop rather than recursion: depth is
//! attacker-influenced, and the ceiling must hold deterministically without
//! relying on a call-stack limit.

use crate::decoder::{DecodeError, NodeDecoder};
use crate::hasher::NodeHasher;
use crate::nibbles::{byte_slice, NibbleSlice, OutOfBounds};
use crate::trie::{NodeHandle, NodeHash, NodeKind};

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use hashbrown::HashMap;

/// The maximum number of nodes one traversal will visit.
///
/// 50 levels safely exceeds any realistic trie depth for 32-byte keys. This
/// is a hard ceiling, not a tunable: raising it reopens a denial-of-service
/// surface for maliciously deep proof sets.
pub const MAX_TRIE_DEPTH: usize = 50;

/// Errors in proof verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// A proof entry could not be parsed into a recognized node shape.
    MalformedNode(DecodeError),
    /// Traversal dereferenced a hash absent from the supplied proof set,
    /// meaning the proof is insufficient or tampered with.
    NodeNotFound(NodeHash),
    /// A nibble index violated the bounds of its slice.
    OutOfBounds,
}

impl From<DecodeError> for VerifyError {
    fn from(err: DecodeError) -> Self {
        VerifyError::MalformedNode(err)
    }
}

impl From<OutOfBounds> for VerifyError {
    fn from(_: OutOfBounds) -> Self {
        VerifyError::OutOfBounds
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VerifyError::MalformedNode(err) => write!(f, "malformed proof node: {}", err),
            VerifyError::NodeNotFound(hash) => {
                write!(f, "proof has no node with hash 0x{}", hex::encode(hash))
            }
            VerifyError::OutOfBounds => write!(f, "nibble index out of bounds"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {}

/// A hash-addressed index over the raw nodes of one proof.
///
/// Each entry is keyed by the digest of its encoding, making resolution O(1)
/// and the soundness check explicit: a hash with no entry is
/// [`VerifyError::NodeNotFound`]. The table is read-only once built.
///
/// There is no implicit caching across calls. Callers verifying several keys
/// against the same proof set should build one table and use
/// [`verify_with_table`].
pub struct NodeTable<'a, H> {
    nodes: HashMap<NodeHash, &'a [u8]>,
    _hasher: PhantomData<H>,
}

impl<'a, H: NodeHasher> NodeTable<'a, H> {
    /// Index every proof entry by the digest of its encoding.
    pub fn new<T: AsRef<[u8]>>(proof: &'a [T]) -> Self {
        let mut nodes = HashMap::with_capacity(proof.len());
        for encoded in proof {
            let encoded = encoded.as_ref();
            nodes.insert(H::hash_node(encoded), encoded);
        }
        NodeTable {
            nodes,
            _hasher: PhantomData,
        }
    }

    /// Resolve a raw node encoding by its content hash.
    pub fn lookup(&self, hash: &NodeHash) -> Result<&'a [u8], VerifyError> {
        match self.nodes.get(hash) {
            Some(encoded) => Ok(encoded),
            None => {
                log::debug!("proof set has no preimage for 0x{}", hex::encode(hash));
                Err(VerifyError::NodeNotFound(*hash))
            }
        }
    }

    /// Resolve a handle: inline bytes directly, hashed references via
    /// [`Self::lookup`].
    pub fn resolve(&self, handle: NodeHandle<'a>) -> Result<&'a [u8], VerifyError> {
        match handle {
            NodeHandle::Inline(encoded) => Ok(encoded),
            NodeHandle::Hash(hash) => self.lookup(&hash),
        }
    }
}

/// Verify a trie proof for `key` against the given root hash.
///
/// Returns the proven value, or `None` when the proof demonstrates the key
/// is absent. A present value that happens to be empty is `Some(vec![])`,
/// distinct from absence.
///
/// The proof is a list of raw node encodings; the first entry is
/// conventionally the preimage of `root`, and an empty trie is proven by
/// supplying the empty node's encoding.
pub fn verify_proof<H, D, T>(
    root: &NodeHash,
    proof: &[T],
    key: &[u8],
) -> Result<Option<Vec<u8>>, VerifyError>
where
    H: NodeHasher,
    D: NodeDecoder,
    T: AsRef<[u8]>,
{
    let table = NodeTable::<H>::new(proof);
    verify_with_table::<H, D>(&table, root, key)
}

/// Verify a trie proof for `key` using a prebuilt [`NodeTable`].
pub fn verify_with_table<H, D>(
    table: &NodeTable<'_, H>,
    root: &NodeHash,
    key: &[u8],
) -> Result<Option<Vec<u8>>, VerifyError>
where
    H: NodeHasher,
    D: NodeDecoder,
{
    let mut encoded = table.lookup(root)?;
    let mut cursor = NibbleSlice::new(key);

    for _ in 0..MAX_TRIE_DEPTH {
        let next = match D::decode_node(encoded)? {
            NodeKind::Empty => return Ok(None),
            NodeKind::Leaf { partial, value } => {
                // Re-anchor the remainder at the byte containing the cursor;
                // the parity of the consumed nibble count carries over.
                let consumed = cursor.offset();
                let remainder =
                    NibbleSlice::new_offset(byte_slice(key, consumed / 2), consumed % 2);
                return if remainder == partial {
                    table.resolve(value).map(|value| Some(value.to_vec()))
                } else {
                    Ok(None)
                };
            }
            NodeKind::Extension { partial, child } => {
                if !cursor.starts_with(&partial) {
                    return Ok(None);
                }
                cursor = cursor.mid(partial.len())?;
                child
            }
            NodeKind::Branch { value, children } => {
                if cursor.is_empty() {
                    return match value {
                        Some(handle) => table.resolve(handle).map(|value| Some(value.to_vec())),
                        None => Ok(None),
                    };
                }
                let index = cursor.at(0)? as usize;
                match children[index] {
                    Some(child) => {
                        cursor = cursor.mid(1)?;
                        child
                    }
                    None => return Ok(None),
                }
            }
        };
        encoded = table.resolve(next)?;
    }

    // A path this deep cannot arise from an honest proof for this key space.
    log::warn!(
        "proof traversal exceeded {} nodes; treating key as absent",
        MAX_TRIE_DEPTH,
    );
    Ok(None)
}

/// Verify a proof for an Ethereum trie: Keccak-256 hashing, RLP nodes.
#[cfg(feature = "keccak-hasher")]
pub fn verify_ethereum_proof<T: AsRef<[u8]>>(
    root: &NodeHash,
    proof: &[T],
    key: &[u8],
) -> Result<Option<Vec<u8>>, VerifyError> {
    verify_proof::<crate::hasher::KeccakHasher, crate::decoder::RlpNodeDecoder, T>(root, proof, key)
}
