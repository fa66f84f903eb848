//! Decoding raw proof entries into typed trie nodes.
//!
//! The traversal in [`crate::proof`] depends only on the [`NodeDecoder`]
//! trait; the wire encoding is a pluggable concern, and a different trie
//! flavor plugs in a different decoder without touching the verifier.
//!
//! [`RlpNodeDecoder`] is the shipped implementation for the Ethereum format:
//! RLP-encoded nodes whose partial keys use hex-prefix ("compact") encoding.

use crate::nibbles::NibbleSlice;
use crate::trie::{NodeHandle, NodeKind, BRANCH_CHILDREN};

use alloy_rlp::Header;
use arrayvec::ArrayVec;
use core::fmt;

/// Reason a raw proof entry failed to parse into a recognized node shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The outer RLP structure is invalid or non-canonical.
    Rlp(alloy_rlp::Error),
    /// The encoding parses as RLP but is not a recognized node shape: a
    /// non-empty byte string, or a list that is neither two nor seventeen
    /// items long.
    UnrecognizedShape,
    /// The hex-prefix flag of a partial key is invalid, or an even-length
    /// path carries a non-zero padding nibble.
    InvalidPathPrefix,
    /// A child or value reference has an invalid length or form.
    InvalidReference,
    /// Bytes remain past the end of the node's outer encoding.
    TrailingBytes,
}

impl From<alloy_rlp::Error> for DecodeError {
    fn from(err: alloy_rlp::Error) -> Self {
        DecodeError::Rlp(err)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::Rlp(err) => write!(f, "invalid rlp: {}", err),
            DecodeError::UnrecognizedShape => write!(f, "unrecognized node shape"),
            DecodeError::InvalidPathPrefix => write!(f, "invalid hex-prefix path"),
            DecodeError::InvalidReference => write!(f, "invalid child reference"),
            DecodeError::TrailingBytes => write!(f, "trailing bytes after node"),
        }
    }
}

/// A format-specific decoder turning a raw encoding into a [`NodeKind`].
pub trait NodeDecoder {
    /// Decode a raw node encoding.
    ///
    /// The returned node borrows from `encoded`; partial keys are views into
    /// it and child references either embed slices of it or name a hash.
    fn decode_node(encoded: &[u8]) -> Result<NodeKind<'_>, DecodeError>;
}

/// The Ethereum node format.
///
/// - The RLP empty string is the empty node.
/// - Two-item lists are leaves or extensions, told apart by the hex-prefix
///   flag of the first item.
/// - Seventeen-item lists are branches: sixteen child slots plus a value
///   slot.
///
/// A child encoding shorter than 32 bytes is embedded in place as a nested
/// list; all other children appear as 32-byte hash references.
pub struct RlpNodeDecoder;

impl NodeDecoder for RlpNodeDecoder {
    fn decode_node(encoded: &[u8]) -> Result<NodeKind<'_>, DecodeError> {
        let mut buf = encoded;
        let node = take_item(&mut buf)?;
        if !buf.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        if !node.list {
            return if node.payload.is_empty() {
                Ok(NodeKind::Empty)
            } else {
                Err(DecodeError::UnrecognizedShape)
            };
        }

        let mut items: ArrayVec<Item, 17> = ArrayVec::new();
        let mut payload = node.payload;
        while !payload.is_empty() {
            if items.is_full() {
                return Err(DecodeError::UnrecognizedShape);
            }
            items.push(take_item(&mut payload)?);
        }

        match items.len() {
            2 => {
                let path = &items[0];
                if path.list {
                    return Err(DecodeError::UnrecognizedShape);
                }
                let (partial, is_leaf) = unpack_path(path.payload)?;
                if is_leaf {
                    let value = &items[1];
                    if value.list {
                        return Err(DecodeError::InvalidReference);
                    }
                    Ok(NodeKind::Leaf {
                        partial,
                        value: NodeHandle::Inline(value.payload),
                    })
                } else {
                    let child = child_handle(&items[1])?.ok_or(DecodeError::InvalidReference)?;
                    Ok(NodeKind::Extension { partial, child })
                }
            }
            17 => {
                let mut children = [None; BRANCH_CHILDREN];
                for (slot, item) in children.iter_mut().zip(&items[..BRANCH_CHILDREN]) {
                    *slot = child_handle(item)?;
                }
                let slot = &items[BRANCH_CHILDREN];
                if slot.list {
                    return Err(DecodeError::InvalidReference);
                }
                let value = if slot.payload.is_empty() {
                    None
                } else {
                    Some(NodeHandle::Inline(slot.payload))
                };
                Ok(NodeKind::Branch { value, children })
            }
            _ => Err(DecodeError::UnrecognizedShape),
        }
    }
}

/// An RLP item carved out of a node encoding.
struct Item<'a> {
    /// The item's full encoding, header included.
    raw: &'a [u8],
    /// The item's payload, header stripped.
    payload: &'a [u8],
    list: bool,
}

fn take_item<'a>(buf: &mut &'a [u8]) -> Result<Item<'a>, DecodeError> {
    let start = *buf;
    let header = Header::decode(buf)?;
    if header.payload_length > buf.len() {
        return Err(DecodeError::Rlp(alloy_rlp::Error::InputTooShort));
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(Item {
        raw: &start[..start.len() - rest.len()],
        payload,
        list: header.list,
    })
}

/// Unpack a hex-prefix ("compact") encoded partial key.
///
/// The flag nibble distinguishes extensions (0, 1) from leaves (2, 3); odd
/// flags carry the first key nibble in the prefix byte, even flags require a
/// zero padding nibble.
fn unpack_path(payload: &[u8]) -> Result<(NibbleSlice<'_>, bool), DecodeError> {
    let first = *payload.first().ok_or(DecodeError::InvalidPathPrefix)?;
    let flag = first >> 4;
    if flag > 3 {
        return Err(DecodeError::InvalidPathPrefix);
    }
    let is_leaf = flag & 0b10 != 0;
    let offset = if flag & 1 == 1 {
        1
    } else {
        if first & 0x0f != 0 {
            return Err(DecodeError::InvalidPathPrefix);
        }
        2
    };
    Ok((NibbleSlice::new_offset(payload, offset), is_leaf))
}

/// Interpret an item as a child slot: vacant, a 32-byte hash reference, or a
/// node embedded in place.
fn child_handle<'a>(item: &Item<'a>) -> Result<Option<NodeHandle<'a>>, DecodeError> {
    if item.list {
        if item.raw.len() >= 32 {
            return Err(DecodeError::InvalidReference);
        }
        return Ok(Some(NodeHandle::Inline(item.raw)));
    }
    match item.payload.len() {
        0 => Ok(None),
        32 => {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(item.payload);
            Ok(Some(NodeHandle::Hash(hash)))
        }
        _ => Err(DecodeError::InvalidReference),
    }
}
