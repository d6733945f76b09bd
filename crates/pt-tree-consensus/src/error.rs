//! Error types for the tree-consensus engine

use crate::domain::BlockId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for tree operations
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Why a candidate chain was refused.
///
/// A rejection always discards the whole chain; the tree is left untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChainRejection {
    /// Recomputed parent hash differs from the stored `previous_hash`
    #[error("Hash mismatch at depth {depth}: parent hashes to {expected}, block stores {actual}")]
    HashMismatch {
        /// Depth of the offending block
        depth: u64,
        /// Digest of the parent as found in the chain
        expected: String,
        /// `previous_hash` carried by the block
        actual: String,
    },

    /// Proof does not satisfy the predicate against the parent's proof
    #[error("Invalid proof at depth {depth}: {proof:?} does not follow {previous_proof:?}")]
    InvalidProof {
        /// Depth of the offending block
        depth: u64,
        /// Parent's proof
        previous_proof: String,
        /// Block's proof
        proof: String,
    },

    /// The chain does not descend from this tree's root
    #[error("Foreign root: expected {expected}, chain is rooted at {actual}")]
    ForeignRoot {
        /// Hash of this tree's root
        expected: String,
        /// Hash of the chain's discovered root
        actual: String,
    },

    /// Nothing to merge: unknown leaf, or a chain holding only the root
    #[error("Empty chain")]
    EmptyChain,

    /// A block's depth is not its parent's depth plus one
    #[error("Depth mismatch: expected {expected}, got {actual}")]
    DepthMismatch {
        /// Parent depth + 1
        expected: u64,
        /// Depth carried by the block
        actual: u64,
    },
}

/// Label for a [`ChainRejection`], used in events and metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    HashMismatch,
    InvalidProof,
    ForeignRoot,
    EmptyChain,
    DepthMismatch,
}

impl RejectionKind {
    /// Stable lowercase label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HashMismatch => "hash_mismatch",
            Self::InvalidProof => "invalid_proof",
            Self::ForeignRoot => "foreign_root",
            Self::EmptyChain => "empty_chain",
            Self::DepthMismatch => "depth_mismatch",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChainRejection {
    /// Kind of this rejection
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::HashMismatch { .. } => RejectionKind::HashMismatch,
            Self::InvalidProof { .. } => RejectionKind::InvalidProof,
            Self::ForeignRoot { .. } => RejectionKind::ForeignRoot,
            Self::EmptyChain => RejectionKind::EmptyChain,
            Self::DepthMismatch { .. } => RejectionKind::DepthMismatch,
        }
    }

    /// Whether the peer that supplied the chain sent something malformed.
    ///
    /// An empty chain is a no-op, not misbehaviour.
    pub fn is_peer_fault(&self) -> bool {
        !matches!(self, Self::EmptyChain)
    }
}

/// Proof-of-work search ended without a proof
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MiningError {
    /// Iteration cap reached
    #[error("Mining exhausted after {iterations} iterations")]
    Exhausted {
        /// Nonces tried
        iterations: u64,
    },

    /// Cancelled by the caller
    #[error("Mining cancelled after {iterations} iterations")]
    Cancelled {
        /// Nonces tried before cancellation was observed
        iterations: u64,
    },
}

/// Errors that can occur while operating on a block tree
#[derive(Debug, Error)]
pub enum TreeError {
    /// Block id not present in the tree
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),

    /// A parentless block needs an explicit `previous_hash`
    #[error("Block without parent must carry a previous hash")]
    MissingPreviousHash,

    /// Candidate chain or local block failed validation
    #[error("Chain rejected: {0}")]
    Rejected(#[from] ChainRejection),

    /// Proof-of-work search failed
    #[error("Mining error: {0}")]
    Mining(#[from] MiningError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TreeError {
    /// Check if error is recoverable (caller may retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Mining(MiningError::Exhausted { .. }))
    }

    /// Check if error is critical (the node should stop)
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::Internal(_))
    }

    /// Rejection carried by this error, if any
    pub fn rejection(&self) -> Option<&ChainRejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}
