//! A reference trie for generating proof fixtures.
//!
//! Builds an in-memory Merkle Patricia Trie under the Ethereum encoding
//! rules (hex-prefix paths, children shorter than 32 bytes embedded in
//! place) and extracts the minimal witness for a key. This is test support
//! only: the library itself never constructs or mutates tries.

use crate::hasher::NodeHasher;
use crate::trie::NodeHash;

use alloy_rlp::Encodable;

/// An owned, buildable trie node.
pub enum TestNode {
    Empty,
    Leaf {
        partial: Vec<u8>,
        value: Vec<u8>,
    },
    Extension {
        partial: Vec<u8>,
        child: Box<TestNode>,
    },
    Branch {
        children: [Option<Box<TestNode>>; 16],
        value: Option<Vec<u8>>,
    },
}

impl TestNode {
    // Partial keys and `nibs` are nibble arrays, one nibble per byte.
    fn insert(self, nibs: &[u8], value: Vec<u8>) -> TestNode {
        match self {
            TestNode::Empty => TestNode::Leaf {
                partial: nibs.to_vec(),
                value,
            },
            TestNode::Leaf {
                partial,
                value: old,
            } => {
                let common = lcp(&partial, nibs);
                if common == partial.len() && common == nibs.len() {
                    return TestNode::Leaf { partial, value };
                }
                let mut children: [Option<Box<TestNode>>; 16] = Default::default();
                let mut slot_value = None;
                if common == partial.len() {
                    slot_value = Some(old);
                } else {
                    children[partial[common] as usize] = Some(Box::new(TestNode::Leaf {
                        partial: partial[common + 1..].to_vec(),
                        value: old,
                    }));
                }
                let branch = TestNode::Branch {
                    children,
                    value: slot_value,
                };
                wrap_extension(&partial[..common], branch.insert(&nibs[common..], value))
            }
            TestNode::Extension { partial, child } => {
                let common = lcp(&partial, nibs);
                if common == partial.len() {
                    return TestNode::Extension {
                        partial,
                        child: Box::new(child.insert(&nibs[common..], value)),
                    };
                }
                let mut children: [Option<Box<TestNode>>; 16] = Default::default();
                children[partial[common] as usize] = Some(Box::new(if common + 1 == partial.len() {
                    *child
                } else {
                    TestNode::Extension {
                        partial: partial[common + 1..].to_vec(),
                        child,
                    }
                }));
                let branch = TestNode::Branch {
                    children,
                    value: None,
                };
                wrap_extension(&partial[..common], branch.insert(&nibs[common..], value))
            }
            TestNode::Branch {
                mut children,
                value: branch_value,
            } => {
                if nibs.is_empty() {
                    return TestNode::Branch {
                        children,
                        value: Some(value),
                    };
                }
                let index = nibs[0] as usize;
                let child = match children[index].take() {
                    Some(child) => child.insert(&nibs[1..], value),
                    None => TestNode::Leaf {
                        partial: nibs[1..].to_vec(),
                        value,
                    },
                };
                children[index] = Some(Box::new(child));
                TestNode::Branch {
                    children,
                    value: branch_value,
                }
            }
        }
    }
}

fn wrap_extension(prefix: &[u8], node: TestNode) -> TestNode {
    if prefix.is_empty() {
        node
    } else {
        TestNode::Extension {
            partial: prefix.to_vec(),
            child: Box::new(node),
        }
    }
}

/// A buildable trie with witness extraction.
pub struct Trie {
    root: TestNode,
}

impl Trie {
    pub fn new() -> Self {
        Trie {
            root: TestNode::Empty,
        }
    }

    /// Wrap a hand-built node tree, for shapes `insert` would never produce.
    pub fn from_node(root: TestNode) -> Self {
        Trie { root }
    }

    pub fn insert(&mut self, key: &[u8], value: &[u8]) {
        let root = core::mem::replace(&mut self.root, TestNode::Empty);
        self.root = root.insert(&to_nibbles(key), value.to_vec());
    }

    pub fn root_hash<H: NodeHasher>(&self) -> NodeHash {
        H::hash_node(&encode_node::<H>(&self.root))
    }

    /// The minimal witness for `key`: the root encoding followed by every
    /// hashed node along the lookup path. Embedded nodes travel inside their
    /// parents.
    pub fn prove<H: NodeHasher>(&self, key: &[u8]) -> Vec<Vec<u8>> {
        let nibs = to_nibbles(key);
        let mut nibs = nibs.as_slice();
        let mut proof = vec![encode_node::<H>(&self.root)];
        let mut node = &self.root;
        loop {
            node = match node {
                TestNode::Empty | TestNode::Leaf { .. } => break,
                TestNode::Extension { partial, child } => {
                    if nibs.len() < partial.len() || &nibs[..partial.len()] != partial.as_slice() {
                        break;
                    }
                    nibs = &nibs[partial.len()..];
                    child
                }
                TestNode::Branch { children, .. } => {
                    if nibs.is_empty() {
                        break;
                    }
                    match &children[nibs[0] as usize] {
                        Some(child) => {
                            nibs = &nibs[1..];
                            child
                        }
                        None => break,
                    }
                }
            };
            let encoded = encode_node::<H>(node);
            if encoded.len() >= 32 {
                proof.push(encoded);
            }
        }
        proof
    }
}

pub fn encode_node<H: NodeHasher>(node: &TestNode) -> Vec<u8> {
    match node {
        TestNode::Empty => vec![alloy_rlp::EMPTY_STRING_CODE],
        TestNode::Leaf { partial, value } => {
            let mut payload = Vec::new();
            hex_prefix(partial, true).as_slice().encode(&mut payload);
            value.as_slice().encode(&mut payload);
            wrap_list(payload)
        }
        TestNode::Extension { partial, child } => {
            let mut payload = Vec::new();
            hex_prefix(partial, false).as_slice().encode(&mut payload);
            payload.extend_from_slice(&reference::<H>(child));
            wrap_list(payload)
        }
        TestNode::Branch { children, value } => {
            let mut payload = Vec::new();
            for child in children {
                match child {
                    Some(child) => payload.extend_from_slice(&reference::<H>(child)),
                    None => payload.push(alloy_rlp::EMPTY_STRING_CODE),
                }
            }
            match value {
                Some(value) => value.as_slice().encode(&mut payload),
                None => payload.push(alloy_rlp::EMPTY_STRING_CODE),
            }
            wrap_list(payload)
        }
    }
}

// A child is embedded in place when its encoding is shorter than 32 bytes,
// otherwise referenced as an RLP string holding its hash.
fn reference<H: NodeHasher>(node: &TestNode) -> Vec<u8> {
    let encoded = encode_node::<H>(node);
    if encoded.len() < 32 {
        encoded
    } else {
        let mut out = Vec::with_capacity(33);
        H::hash_node(&encoded).as_slice().encode(&mut out);
        out
    }
}

fn wrap_list(payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    alloy_rlp::Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend_from_slice(&payload);
    out
}

fn hex_prefix(nibs: &[u8], is_leaf: bool) -> Vec<u8> {
    let mut prefix = (is_leaf as u8) * 0x20;
    let mut nibs = nibs;
    if nibs.len() % 2 != 0 {
        prefix += 0x10 + nibs[0];
        nibs = &nibs[1..];
    }
    core::iter::once(prefix)
        .chain(nibs.chunks_exact(2).map(|pair| (pair[0] << 4) + pair[1]))
        .collect()
}

pub fn to_nibbles(key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() * 2);
    for byte in key {
        out.push(byte >> 4);
        out.push(byte & 0x0f);
    }
    out
}

fn lcp(a: &[u8], b: &[u8]) -> usize {
    for (i, (a, b)) in core::iter::zip(a, b).enumerate() {
        if a != b {
            return i;
        }
    }
    core::cmp::min(a.len(), b.len())
}
