//! Domain entities for the block tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// `previous_hash` carried by the root block
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// `proof` carried by the root block
pub const GENESIS_PROOF: &str = "100";

/// Content of the root block unless configured otherwise
pub const GENESIS_CONTENT: &str = "the ur post";

/// Root block timestamp (unix millis) unless configured otherwise.
///
/// Fixed so that independently started nodes agree on the root hash.
pub const GENESIS_TIMESTAMP: u64 = 1_600_000_000_000;

/// Opaque payload of a block. The engine never interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Post {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Post {
    /// Text-only post
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image: None,
        }
    }

    /// Post with an image URI
    pub fn with_image(content: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image: Some(image.into()),
        }
    }
}

/// Hash-relevant content of a block.
///
/// Tree links live in [`TreeNode`], never here, so the canonical form of a
/// block cannot depend on where it sits in a tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub depth: u64,
    /// Unix time in milliseconds
    pub timestamp: u64,
    pub post: Post,
    pub proof: String,
    pub previous_hash: String,
}

impl Block {
    /// Digest of the canonical form
    pub fn hash(&self) -> String {
        crate::utils::hash_block(self)
    }

    /// Whether this block carries the root sentinels
    pub fn is_genesis(&self) -> bool {
        self.depth == 0
            && self.previous_hash == GENESIS_PREVIOUS_HASH
            && self.proof == GENESIS_PROOF
    }
}

/// Stable index of a block inside an arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of a known peer node
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arena slot: a block plus its position in the tree.
///
/// `parent` is non-owning and only used for upward walks; `children` are
/// the owned, ordered descendants.
#[derive(Clone, Debug)]
pub struct TreeNode {
    pub block: Block,
    pub parent: Option<BlockId>,
    pub children: Vec<BlockId>,
}

/// Arguments for constructing a block
#[derive(Clone, Debug)]
pub struct NewBlock {
    /// Explicit lineage hash; computed from `parent` when absent
    pub previous_hash: Option<String>,
    pub proof: String,
    pub post: Post,
    pub parent: Option<BlockId>,
}

/// Read-only access to an arena of blocks linked by parent pointers.
///
/// Implemented by the authoritative [`BlockTree`](super::BlockTree) and by
/// untrusted [`PeerTree`](super::PeerTree) views, so chains can be walked
/// from either.
pub trait ChainSource {
    /// Block stored at `id`
    fn block(&self, id: BlockId) -> Option<&Block>;

    /// Parent of `id`, `None` at a root or for unknown ids
    fn parent(&self, id: BlockId) -> Option<BlockId>;

    /// Number of stored blocks
    fn len(&self) -> usize;

    /// Whether the source holds no blocks
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Current unix time in milliseconds
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
