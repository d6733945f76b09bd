//! Chain validation
//!
//! Peers announce leaves; a leaf is only a pointer into the peer's view.
//! The validator walks it back to the root and checks every link before any
//! of it may touch the authoritative tree.

use super::entities::{Block, BlockId, ChainSource};
use super::pow::ProofOfWork;
use super::tree::path_to_root;
use crate::error::ChainRejection;
use crate::utils::hash_block;

/// A root-to-leaf chain that passed validation.
///
/// Only [`ChainValidator`] constructs these, so the merger never sees an
/// unchecked chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedChain {
    blocks: Vec<Block>,
}

impl ValidatedChain {
    /// Blocks from the root down to the leaf
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks, root included
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a validated chain holds at least the root and one block
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The leaf block
    pub fn leaf(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub(crate) fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }
}

/// Checks candidate chains against one tree's root
#[derive(Clone, Debug)]
pub struct ChainValidator {
    root_hash: String,
    pow: ProofOfWork,
}

impl ChainValidator {
    /// Validator for the tree whose root hashes to `root_hash`
    pub fn new(root_hash: impl Into<String>, pow: ProofOfWork) -> Self {
        Self {
            root_hash: root_hash.into(),
            pow,
        }
    }

    /// Root hash chains must descend from
    pub fn root_hash(&self) -> &str {
        &self.root_hash
    }

    /// Predicate used for proof checks
    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Walk `leaf` to its root in `source` and verify the whole chain.
    ///
    /// Checks run root-first and stop at the first violation, so the
    /// shallowest broken link is the one reported.
    #[tracing::instrument(skip(self, source), fields(source_len = source.len()))]
    pub fn valid_chain<S: ChainSource + ?Sized>(
        &self,
        source: &S,
        leaf: BlockId,
    ) -> Result<ValidatedChain, ChainRejection> {
        let path = path_to_root(source, leaf);

        let mut blocks = Vec::with_capacity(path.len());
        for id in path.iter().rev() {
            let block = source.block(*id).ok_or(ChainRejection::EmptyChain)?;
            blocks.push(block.clone());
        }

        let Some(root) = blocks.first() else {
            tracing::debug!(%leaf, "leaf not present in source");
            return Err(ChainRejection::EmptyChain);
        };

        let discovered_root = hash_block(root);
        if discovered_root != self.root_hash {
            tracing::debug!(%discovered_root, "chain rooted in another tree");
            return Err(ChainRejection::ForeignRoot {
                expected: self.root_hash.clone(),
                actual: discovered_root,
            });
        }

        if blocks.len() == 1 {
            return Err(ChainRejection::EmptyChain);
        }

        for pair in blocks.windows(2) {
            self.verify_link(&pair[0], &pair[1])?;
        }

        tracing::debug!(len = blocks.len(), "chain validated");
        Ok(ValidatedChain { blocks })
    }

    /// Verify that `block` may sit directly under `parent`
    pub fn verify_link(&self, parent: &Block, block: &Block) -> Result<(), ChainRejection> {
        let parent_hash = hash_block(parent);
        if parent_hash != block.previous_hash {
            return Err(ChainRejection::HashMismatch {
                depth: block.depth,
                expected: parent_hash,
                actual: block.previous_hash.clone(),
            });
        }

        if !self.pow.valid_proof(&parent.proof, &block.proof) {
            return Err(ChainRejection::InvalidProof {
                depth: block.depth,
                previous_proof: parent.proof.clone(),
                proof: block.proof.clone(),
            });
        }

        let expected_depth = parent.depth + 1;
        if block.depth != expected_depth {
            return Err(ChainRejection::DepthMismatch {
                expected: expected_depth,
                actual: block.depth,
            });
        }

        Ok(())
    }
}
