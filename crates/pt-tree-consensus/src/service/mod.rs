//! Block Tree Service - the single mutation point
//!
//! The service owns the authoritative [`BlockTree`] behind one write lock.
//! Every structural change, whether a locally mined block or a merged peer
//! chain, is applied under that lock, so the merger always walks a stable
//! tree.
//!
//! Proof-of-work runs on the blocking pool against a copy of the parent's
//! proof and never holds the lock. Peer chains are validated against the
//! root hash, which never changes, so validation does not take the lock
//! either.

use crate::config::TreeConfig;
use crate::domain::{
    Block, BlockId, BlockTree, ChainSource, ChainValidator, MergeOutcome, MinedProof, NewBlock,
    PeerId, PeerTree, Post, ProofOfWork, TreeMerger,
};
use crate::error::{ChainRejection, MiningError, TreeError, TreeResult};
use crate::events::{BlockProposedEvent, ChainMergedEvent, ChainRejectedEvent, TreeEvent};
use crate::metrics;
use crate::ports::{
    BlockTreeApi, EventPublisher, ParentSelector, PeerRegistry, ProposalReceipt,
    SystemTimeSource, TimeSource,
};
use crate::utils::hash_block;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Block Tree Service
pub struct BlockTreeService<P, R>
where
    P: EventPublisher,
    R: PeerRegistry,
{
    tree: Arc<RwLock<BlockTree>>,
    validator: ChainValidator,
    pow: ProofOfWork,
    config: TreeConfig,
    events: Arc<P>,
    peers: Arc<R>,
    time_source: Arc<dyn TimeSource>,
    cancelled: Arc<AtomicBool>,
}

/// Dependencies for BlockTreeService
pub struct TreeDependencies<P, R> {
    pub events: Arc<P>,
    pub peers: Arc<R>,
    pub config: TreeConfig,
}

/// Outcome of one mining attempt at the serialization point
enum Attempt {
    Attached(ProposalReceipt),
    TipMoved,
}

impl<P, R> BlockTreeService<P, R>
where
    P: EventPublisher,
    R: PeerRegistry,
{
    /// Create a service with a fresh tree rooted at the configured genesis
    pub fn new(deps: TreeDependencies<P, R>) -> TreeResult<Self> {
        deps.config.validate()?;

        let tree = BlockTree::new(&deps.config.genesis);
        let pow = ProofOfWork::new(deps.config.pow);
        let validator = ChainValidator::new(tree.root_hash(), pow.clone());

        info!(
            root = %tree.root_hash(),
            difficulty = deps.config.pow.difficulty,
            "block tree service initialised"
        );

        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
            validator,
            pow,
            config: deps.config,
            events: deps.events,
            peers: deps.peers,
            time_source: Arc::new(SystemTimeSource),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Proof-of-work engine shared by mining and validation
    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Run `f` against the tree under the read lock
    pub fn with_tree<T>(&self, f: impl FnOnce(&BlockTree) -> T) -> T {
        f(&self.tree.read())
    }

    /// Untrusted copy of the tree, suitable for handing to another node
    pub fn snapshot(&self) -> PeerTree {
        self.tree.read().snapshot()
    }

    // === MINING ===

    /// Stop running searches and refuse new ones until [`resume_mining`](Self::resume_mining)
    pub fn cancel_mining(&self) {
        info!("mining cancelled");
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Allow searches again after [`cancel_mining`](Self::cancel_mining)
    pub fn resume_mining(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Search for a proof following `previous_proof` on the blocking pool
    async fn mine(&self, previous_proof: String) -> TreeResult<MinedProof> {
        let pow = self.pow.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let max_iterations = self.config.mining.max_iterations;

        let mined = tokio::task::spawn_blocking(move || {
            pow.proof_of_work_bounded(&previous_proof, max_iterations, &cancelled)
        })
        .await
        .map_err(|e| TreeError::Internal(format!("mining task failed: {e}")))??;

        metrics::record_mining_iterations(mined.iterations);
        Ok(mined)
    }

    /// Resolve the selected parent and copy its proof
    fn mining_target(&self, selector: ParentSelector) -> TreeResult<(BlockId, String)> {
        let tree = self.tree.read();
        let id = match selector {
            ParentSelector::Tip => tree.tip(),
            ParentSelector::Block(id) => id,
        };
        let parent = tree.block(id).ok_or(TreeError::UnknownBlock(id))?;
        Ok((id, parent.proof.clone()))
    }

    /// Attach a freshly mined block, unless the tip it was aimed at moved
    fn commit_mined(
        &self,
        selector: ParentSelector,
        parent: BlockId,
        post: &Post,
        mined: MinedProof,
        retries: u32,
    ) -> TreeResult<Attempt> {
        let mut tree = self.tree.write();

        if selector == ParentSelector::Tip
            && tree.tip() != parent
            && retries < self.config.mining.max_retries
        {
            return Ok(Attempt::TipMoved);
        }

        let block = tree.new_block_at(
            NewBlock {
                previous_hash: None,
                proof: mined.proof,
                post: post.clone(),
                parent: Some(parent),
            },
            self.time_source.now_millis(),
        )?;

        let parent_block = tree.block(parent).ok_or(TreeError::UnknownBlock(parent))?;
        self.validator.verify_link(parent_block, &block)?;

        let id = tree.attach(parent, block.clone())?;
        metrics::record_blocks_attached(1);

        Ok(Attempt::Attached(ProposalReceipt {
            id,
            block,
            parent,
            iterations: mined.iterations,
            retries,
        }))
    }

    // === MERGING ===

    fn merge(&self, source: &(dyn ChainSource + Sync), leaf: BlockId) -> TreeResult<MergeOutcome> {
        let chain = self.validator.valid_chain(source, leaf)?;
        let mut tree = self.tree.write();
        TreeMerger::append_chain_to_tree(chain, &mut tree)
    }

    fn block_hash(&self, id: BlockId) -> String {
        self.tree
            .read()
            .block(id)
            .map(hash_block)
            .unwrap_or_default()
    }

    async fn publish(&self, event: TreeEvent) {
        let name = event.name();
        if let Err(e) = self.events.publish(event).await {
            warn!(event = name, error = %e, "failed to publish tree event");
        }
    }

    // === PEERS ===

    /// Remember a peer node
    pub fn register_peer(&self, peer: PeerId) -> bool {
        debug!(%peer, "registering peer");
        self.peers.add(peer)
    }

    /// Forget a peer node
    pub fn remove_peer(&self, peer: &PeerId) -> bool {
        self.peers.remove(peer)
    }

    /// Known peer nodes
    pub fn peers(&self) -> Vec<PeerId> {
        self.peers.list()
    }
}

#[async_trait]
impl<P, R> BlockTreeApi for BlockTreeService<P, R>
where
    P: EventPublisher,
    R: PeerRegistry,
{
    #[tracing::instrument(skip(self, post))]
    async fn propose_post(
        &self,
        post: Post,
        parent: ParentSelector,
    ) -> TreeResult<ProposalReceipt> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(MiningError::Cancelled { iterations: 0 }.into());
        }

        let mut retries = 0;
        let receipt = loop {
            let (target, previous_proof) = self.mining_target(parent)?;
            let mined = self.mine(previous_proof).await?;

            match self.commit_mined(parent, target, &post, mined, retries)? {
                Attempt::Attached(receipt) => break receipt,
                Attempt::TipMoved => {
                    retries += 1;
                    info!(retries, "tip moved while mining, retrying against new tip");
                }
            }
        };

        info!(
            id = %receipt.id,
            depth = receipt.block.depth,
            iterations = receipt.iterations,
            "proposed block attached"
        );

        self.publish(TreeEvent::BlockProposed(BlockProposedEvent {
            block_hash: hash_block(&receipt.block),
            parent_hash: receipt.block.previous_hash.clone(),
            depth: receipt.block.depth,
            iterations: receipt.iterations,
            retries: receipt.retries,
        }))
        .await;

        Ok(receipt)
    }

    #[tracing::instrument(skip(self, source))]
    async fn submit_chain(
        &self,
        source: &(dyn ChainSource + Sync),
        leaf: BlockId,
        peer: Option<PeerId>,
    ) -> TreeResult<MergeOutcome> {
        let outcome = match self.merge(source, leaf) {
            Ok(outcome) => outcome,
            Err(TreeError::Rejected(rejection)) => {
                self.reject(&rejection, peer).await;
                return Err(rejection.into());
            }
            Err(e) => return Err(e),
        };

        metrics::record_chain_merged();
        metrics::record_blocks_attached(outcome.attached.len());

        let leaf_id = outcome.new_leaf().unwrap_or(outcome.divergence);
        self.publish(TreeEvent::ChainMerged(ChainMergedEvent {
            peer,
            divergence_hash: self.block_hash(outcome.divergence),
            attached: outcome.attached.len(),
            leaf_hash: self.block_hash(leaf_id),
        }))
        .await;

        Ok(outcome)
    }

    async fn get_block(&self, id: BlockId) -> Option<Block> {
        self.tree.read().block(id).cloned()
    }

    async fn children(&self, id: BlockId) -> Vec<BlockId> {
        self.tree.read().children(id).to_vec()
    }

    async fn tip(&self) -> BlockId {
        self.tree.read().tip()
    }

    async fn block_count(&self) -> usize {
        self.tree.read().len()
    }

    fn root_hash(&self) -> String {
        self.validator.root_hash().to_string()
    }
}

impl<P, R> BlockTreeService<P, R>
where
    P: EventPublisher,
    R: PeerRegistry,
{
    async fn reject(&self, rejection: &ChainRejection, peer: Option<PeerId>) {
        if rejection.is_peer_fault() {
            warn!(kind = %rejection.kind(), %rejection, "rejected candidate chain");
        } else {
            debug!(%rejection, "ignored empty chain");
        }
        metrics::record_chain_rejected(rejection.kind().as_str());

        self.publish(TreeEvent::ChainRejected(ChainRejectedEvent {
            peer,
            kind: rejection.kind(),
            reason: rejection.to_string(),
        }))
        .await;
    }
}
