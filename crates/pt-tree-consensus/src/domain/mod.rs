//! Domain layer - pure tree-consensus logic
//!
//! Everything here is synchronous and free of I/O. Locking, mining threads
//! and event publication live in the service layer.
//!
//! ## Entities
//!
//! - [`Block`]: hash-relevant block content
//! - [`TreeNode`]: arena slot linking a block to its parent and children
//! - [`BlockTree`]: the authoritative tree, append-only
//! - [`PeerTree`]: untrusted view of a peer's blocks
//!
//! ## Services
//!
//! - [`ProofOfWork`]: nonce search and proof predicate
//! - [`ChainValidator`]: leaf-to-root chain verification
//! - [`TreeMerger`]: splices validated chains at the divergence point

mod entities;
mod merge;
mod pow;
mod tree;
mod validation;

pub use entities::*;
pub use merge::{MergeOutcome, TreeMerger};
pub use pow::{MinedProof, ProofOfWork};
pub use tree::{find_root_node, path_to_root, BlockTree, PeerTree};
pub use validation::{ChainValidator, ValidatedChain};
