//! Utility modules for the tree-consensus engine

pub mod hashing;

pub use hashing::{canonicalize, hash_block, sha256_hex};
