//! Inbound ports (driving side - API)

use crate::domain::{Block, BlockId, ChainSource, MergeOutcome, PeerId, Post};
use crate::error::TreeResult;
use async_trait::async_trait;

/// Where a proposed post should be attached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentSelector {
    /// Current deepest block; re-targeted if the tip moves while mining
    Tip,
    /// A specific block
    Block(BlockId),
}

/// Result of a local proposal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalReceipt {
    pub id: BlockId,
    pub block: Block,
    pub parent: BlockId,
    /// Nonces tried by the winning search
    pub iterations: u64,
    /// Searches restarted because the tip moved
    pub retries: u32,
}

/// Primary port: the tree-consensus engine
#[async_trait]
pub trait BlockTreeApi: Send + Sync {
    /// Mine `post` under the selected parent and attach it
    async fn propose_post(&self, post: Post, parent: ParentSelector)
        -> TreeResult<ProposalReceipt>;

    /// Validate the chain ending at `leaf` in `source` and merge it.
    ///
    /// `peer` identifies the supplier for events; the chain is untrusted
    /// either way.
    async fn submit_chain(
        &self,
        source: &(dyn ChainSource + Sync),
        leaf: BlockId,
        peer: Option<PeerId>,
    ) -> TreeResult<MergeOutcome>;

    /// Block stored at `id`
    async fn get_block(&self, id: BlockId) -> Option<Block>;

    /// Children of `id` in attachment order
    async fn children(&self, id: BlockId) -> Vec<BlockId>;

    /// Current deepest block
    async fn tip(&self) -> BlockId;

    /// Number of blocks, root included
    async fn block_count(&self) -> usize;

    /// Hash of the root block
    fn root_hash(&self) -> String;
}
