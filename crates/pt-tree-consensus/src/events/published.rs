//! Published events (Outgoing)

use crate::domain::PeerId;
use crate::error::RejectionKind;
use serde::{Deserialize, Serialize};

/// Something the tree did, published after the write lock is released
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeEvent {
    /// A locally proposed post was mined and attached
    BlockProposed(BlockProposedEvent),
    /// A peer chain was validated and merged
    ChainMerged(ChainMergedEvent),
    /// A peer chain was refused
    ChainRejected(ChainRejectedEvent),
}

/// A locally mined block entered the tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProposedEvent {
    pub block_hash: String,
    pub parent_hash: String,
    pub depth: u64,
    /// Nonces tried by the winning search
    pub iterations: u64,
    /// Searches restarted because the tip moved
    pub retries: u32,
}

/// A validated chain was spliced into the tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMergedEvent {
    pub peer: Option<PeerId>,
    /// Hash of the deepest block shared with the tree
    pub divergence_hash: String,
    /// Number of newly attached blocks (0 for an already known chain)
    pub attached: usize,
    pub leaf_hash: String,
}

/// A candidate chain failed validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRejectedEvent {
    pub peer: Option<PeerId>,
    pub kind: RejectionKind,
    pub reason: String,
}

impl TreeEvent {
    /// Stable name of the event type
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlockProposed(_) => "block_proposed",
            Self::ChainMerged(_) => "chain_merged",
            Self::ChainRejected(_) => "chain_rejected",
        }
    }
}
