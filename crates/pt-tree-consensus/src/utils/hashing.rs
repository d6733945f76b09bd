//! Hashing utilities for the block tree
//!
//! Every digest in this crate is a lowercase hex SHA-256 string. Block
//! hashes are taken over the canonical form of a block, which covers the
//! hash-relevant fields only (depth, timestamp, post, proof, previous hash).
//! Tree links never take part in it.

use crate::domain::Block;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Compute SHA-256 of data as lowercase hex
#[inline]
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Canonical representation of a block's hash-relevant fields.
///
/// Keys are emitted in lexicographic order (`depth`, `post`, `previousHash`,
/// `proof`, `timestamp`), and `image` is omitted when the post has none.
/// The output is identical whether or not serde_json keeps insertion order.
pub fn canonicalize(block: &Block) -> String {
    let mut post = Map::new();
    post.insert("content".into(), Value::String(block.post.content.clone()));
    if let Some(image) = &block.post.image {
        post.insert("image".into(), Value::String(image.clone()));
    }

    json!({
        "depth": block.depth,
        "post": Value::Object(post),
        "previousHash": block.previous_hash,
        "proof": block.proof,
        "timestamp": block.timestamp,
    })
    .to_string()
}

/// Digest of a block's canonical form
pub fn hash_block(block: &Block) -> String {
    sha256_hex(canonicalize(block).as_bytes())
}
