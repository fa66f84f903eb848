//! Assemble a small trie's nodes by hand and verify proofs against it.
//!
//! The verifier never builds tries; a prover does. This demo plays the
//! prover's role for a three-node trie holding two entries, then exercises
//! the verifier with an inclusion proof, an exclusion proof, and a witness
//! with a missing node.

use alloy_rlp::Encodable;
use anyhow::Result;
use mpt_witness_core::hasher::{KeccakHasher, NodeHasher};
use mpt_witness_core::verify_ethereum_proof;

// Hex-prefix encode a partial key, one nibble per byte.
fn hex_prefix(mut nibs: &[u8], is_leaf: bool) -> Vec<u8> {
    let mut prefix = (is_leaf as u8) * 0x20;
    if nibs.len() % 2 != 0 {
        prefix += 0x10 + nibs[0];
        nibs = &nibs[1..];
    }
    std::iter::once(prefix)
        .chain(nibs.chunks_exact(2).map(|pair| (pair[0] << 4) + pair[1]))
        .collect()
}

fn rlp_list(payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    alloy_rlp::Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(&payload);
    out
}

fn leaf(partial: &[u8], value: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    hex_prefix(partial, true).as_slice().encode(&mut payload);
    value.encode(&mut payload);
    rlp_list(payload)
}

fn extension(partial: &[u8], child_hash: &[u8; 32]) -> Vec<u8> {
    let mut payload = Vec::new();
    hex_prefix(partial, false).as_slice().encode(&mut payload);
    child_hash.as_slice().encode(&mut payload);
    rlp_list(payload)
}

fn branch(children: [Option<[u8; 32]>; 16]) -> Vec<u8> {
    let mut payload = Vec::new();
    for child in &children {
        match child {
            Some(hash) => hash.as_slice().encode(&mut payload),
            None => payload.push(alloy_rlp::EMPTY_STRING_CODE),
        }
    }
    // vacant value slot
    payload.push(alloy_rlp::EMPTY_STRING_CODE);
    rlp_list(payload)
}

fn main() -> Result<()> {
    env_logger::init();

    // Two entries sharing the prefix nibbles [1, 2]:
    //   0x1234 -> "alice: 100 coins ................."
    //   0x129a -> "bob: 42 coins ...................."
    let alice_value = b"alice: 100 coins .................";
    let bob_value = b"bob: 42 coins ....................";

    // extension [1, 2] -> branch -> leaves at nibbles 3 and 9
    let alice_leaf = leaf(&[0x4], alice_value);
    let bob_leaf = leaf(&[0xa], bob_value);

    let mut children = [None; 16];
    children[0x3] = Some(KeccakHasher::hash_node(&alice_leaf));
    children[0x9] = Some(KeccakHasher::hash_node(&bob_leaf));
    let fork = branch(children);

    let top = extension(&[0x1, 0x2], &KeccakHasher::hash_node(&fork));
    let root = KeccakHasher::hash_node(&top);
    println!("root: 0x{}", hex::encode(root));

    // Inclusion: the witness carries the path for the queried key.
    let proof = vec![top.clone(), fork.clone(), alice_leaf];
    let value = verify_ethereum_proof(&root, &proof, &[0x12, 0x34])?;
    println!("0x1234 -> {:?}", value.as_deref().map(String::from_utf8_lossy));
    assert_eq!(value.as_deref(), Some(&alice_value[..]));

    let proof = vec![top.clone(), fork.clone(), bob_leaf];
    let value = verify_ethereum_proof(&root, &proof, &[0x12, 0x9a])?;
    println!("0x129a -> {:?}", value.as_deref().map(String::from_utf8_lossy));
    assert_eq!(value.as_deref(), Some(&bob_value[..]));

    // Exclusion: the branch has no child under nibble 7, and the witness
    // proves it without needing the leaves at all.
    let proof = vec![top.clone(), fork.clone()];
    let value = verify_ethereum_proof(&root, &proof, &[0x12, 0x77])?;
    println!("0x1277 -> {:?}", value);
    assert_eq!(value, None);

    // An insufficient witness is an error, never a silent absence.
    let proof = vec![top];
    let err = verify_ethereum_proof(&root, &proof, &[0x12, 0x34]).unwrap_err();
    println!("witness without the fork node: {}", err);

    Ok(())
}
