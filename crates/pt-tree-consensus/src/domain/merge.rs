//! Tree merging
//!
//! Splices a validated chain into the tree at its divergence point: the
//! chain and the tree are walked together from the root, known blocks are
//! followed, and the first unknown block starts the suffix that gets
//! attached.

use super::entities::BlockId;
use super::tree::BlockTree;
use super::validation::ValidatedChain;
use crate::error::{ChainRejection, TreeResult};
use crate::utils::hash_block;

/// What a merge changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Deepest tree block the chain shared with the tree
    pub divergence: BlockId,
    /// Newly attached blocks, root-first
    pub attached: Vec<BlockId>,
}

impl MergeOutcome {
    /// Whether the chain was already fully known
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty()
    }

    /// Id of the chain's leaf inside the tree, if anything was attached
    pub fn new_leaf(&self) -> Option<BlockId> {
        self.attached.last().copied()
    }
}

/// Integrates validated chains into a tree
pub struct TreeMerger;

impl TreeMerger {
    /// Attach the novel suffix of `chain` to `tree`.
    ///
    /// A chain block matches an existing child when both hash the same, so
    /// history already in the tree is never duplicated. The chain must be
    /// rooted at this tree's root; otherwise nothing is touched.
    #[tracing::instrument(skip_all, fields(chain_len = chain.len()))]
    pub fn append_chain_to_tree(
        chain: ValidatedChain,
        tree: &mut BlockTree,
    ) -> TreeResult<MergeOutcome> {
        let mut blocks = chain.into_blocks().into_iter();

        let root = blocks.next().ok_or(ChainRejection::EmptyChain)?;
        let root_hash = hash_block(&root);
        if root_hash != tree.root_hash() {
            return Err(ChainRejection::ForeignRoot {
                expected: tree.root_hash().to_string(),
                actual: root_hash,
            }
            .into());
        }

        let mut current = tree.root_id();
        let mut divergence = None;
        let mut attached = Vec::new();

        for block in blocks {
            if divergence.is_none() {
                if let Some(existing) = tree.child_with_hash(current, &hash_block(&block)) {
                    current = existing;
                    continue;
                }
                divergence = Some(current);
            }
            current = tree.attach(current, block)?;
            attached.push(current);
        }

        let outcome = MergeOutcome {
            divergence: divergence.unwrap_or(current),
            attached,
        };

        if outcome.is_noop() {
            tracing::debug!("chain already known");
        } else {
            tracing::info!(
                divergence = %outcome.divergence,
                attached = outcome.attached.len(),
                "merged chain into tree"
            );
        }
        Ok(outcome)
    }
}
