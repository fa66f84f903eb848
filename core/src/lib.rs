//! Verification of Merkle Patricia Trie witness proofs.
//!
//! A witness is a list of raw encoded trie nodes supplied by a prover. Given
//! the trie's root hash and a lookup key, [`verify_proof`] reconstructs the
//! minimal path from the root to the key's position and returns the value
//! stored there, or `None` when the witness demonstrates the key is absent.
//! Every node dereferenced along the way must be justified by a hash present
//! in the witness; anything else fails the call.
//!
//! The traversal is generic over the node hash function ([`hasher::NodeHasher`])
//! and the wire format ([`decoder::NodeDecoder`]). The Ethereum flavor of both
//! ships with this crate behind the `keccak-hasher` feature.
//!
//! The verification routines of this crate do not require the standard
//! library, but do require Rust's alloc crate.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod decoder;
pub mod hasher;
pub mod nibbles;
pub mod proof;
pub mod trie;

#[cfg(test)]
mod test_trie;

#[cfg(feature = "keccak-hasher")]
pub use proof::verify_ethereum_proof;
pub use proof::{verify_proof, verify_with_table, NodeTable, VerifyError, MAX_TRIE_DEPTH};
