//! Block tree and untrusted peer views
//!
//! Blocks live in an arena indexed by [`BlockId`]. Parents always precede
//! their children in the arena, so parent links cannot form cycles.

use super::entities::{
    unix_millis, Block, BlockId, ChainSource, NewBlock, Post, TreeNode, GENESIS_PREVIOUS_HASH,
    GENESIS_PROOF,
};
use crate::config::GenesisConfig;
use crate::error::{ChainRejection, TreeError, TreeResult};
use crate::utils::hash_block;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
struct Arena {
    nodes: Vec<TreeNode>,
}

impl Arena {
    fn get(&self, id: BlockId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, parent: Option<BlockId>, block: Block) -> TreeResult<BlockId> {
        let id = BlockId(self.nodes.len());
        if let Some(parent) = parent {
            self.nodes
                .get_mut(parent.0)
                .ok_or(TreeError::UnknownBlock(parent))?
                .children
                .push(id);
        }
        self.nodes.push(TreeNode {
            block,
            parent,
            children: Vec::new(),
        });
        Ok(id)
    }
}

/// Walk parent links from `id` to the root.
///
/// Returns `None` for an unknown id. The walk is bounded by the size of the
/// source.
pub fn find_root_node<S: ChainSource + ?Sized>(source: &S, id: BlockId) -> Option<BlockId> {
    source.block(id)?;
    let mut current = id;
    for _ in 0..source.len() {
        match source.parent(current) {
            Some(parent) => current = parent,
            None => return Some(current),
        }
    }
    None
}

/// Ids from `id` up to and including the root, leaf first
pub fn path_to_root<S: ChainSource + ?Sized>(source: &S, id: BlockId) -> Vec<BlockId> {
    let mut path = Vec::new();
    if source.block(id).is_none() {
        return path;
    }
    let mut current = Some(id);
    while let Some(node) = current {
        if path.len() > source.len() {
            break;
        }
        path.push(node);
        current = source.parent(node);
    }
    path
}

/// The authoritative tree.
///
/// Holds one root, created at construction. Blocks are only ever appended
/// and only through validated paths inside this crate.
#[derive(Clone, Debug)]
pub struct BlockTree {
    arena: Arena,
    root: BlockId,
    root_hash: String,
    tip: BlockId,
    by_hash: HashMap<String, BlockId>,
}

impl BlockTree {
    /// Tree containing only the root described by `genesis`
    pub fn new(genesis: &GenesisConfig) -> Self {
        let root_block = Self::construct(
            None,
            NewBlock {
                previous_hash: Some(GENESIS_PREVIOUS_HASH.to_string()),
                proof: GENESIS_PROOF.to_string(),
                post: Post::new(genesis.content.clone()),
                parent: None,
            },
            genesis.timestamp,
        );

        let root_hash = hash_block(&root_block);
        let mut arena = Arena::default();
        let root = BlockId(arena.nodes.len());
        arena.nodes.push(TreeNode {
            block: root_block,
            parent: None,
            children: Vec::new(),
        });

        let mut by_hash = HashMap::new();
        by_hash.insert(root_hash.clone(), root);

        Self {
            arena,
            root,
            root_hash,
            tip: root,
            by_hash,
        }
    }

    /// Construct a block value under `request.parent`, stamped with the
    /// current time. The tree is not modified.
    pub fn new_block(&self, request: NewBlock) -> TreeResult<Block> {
        self.new_block_at(request, unix_millis())
    }

    /// [`new_block`](Self::new_block) with an explicit timestamp
    pub fn new_block_at(&self, request: NewBlock, timestamp: u64) -> TreeResult<Block> {
        let parent = match request.parent {
            Some(id) => Some(self.block(id).ok_or(TreeError::UnknownBlock(id))?),
            None => None,
        };
        if parent.is_none() && request.previous_hash.is_none() {
            return Err(TreeError::MissingPreviousHash);
        }
        Ok(Self::construct(parent, request, timestamp))
    }

    fn construct(parent: Option<&Block>, request: NewBlock, timestamp: u64) -> Block {
        let depth = parent.map_or(0, |p| p.depth + 1);
        let previous_hash = match (request.previous_hash, parent) {
            (Some(hash), _) => hash,
            (None, Some(parent)) => hash_block(parent),
            (None, None) => String::new(),
        };

        Block {
            depth,
            timestamp,
            post: request.post,
            proof: request.proof,
            previous_hash,
        }
    }

    /// Append `block` under `parent`.
    ///
    /// Callers must have validated the link. An identical block already
    /// present under `parent` is returned instead of being duplicated.
    pub(crate) fn attach(&mut self, parent: BlockId, block: Block) -> TreeResult<BlockId> {
        let hash = hash_block(&block);
        if let Some(existing) = self.child_with_hash(parent, &hash) {
            return Ok(existing);
        }

        let depth = block.depth;
        let id = self.arena.push(Some(parent), block)?;
        self.by_hash.insert(hash, id);

        if depth > self.arena.nodes[self.tip.0].block.depth {
            self.tip = id;
        }
        Ok(id)
    }

    /// Child of `parent` whose block hashes to `hash`
    pub fn child_with_hash(&self, parent: BlockId, hash: &str) -> Option<BlockId> {
        self.by_hash
            .get(hash)
            .copied()
            .filter(|id| self.arena.get(*id).and_then(|n| n.parent) == Some(parent))
    }

    /// Id of the root block
    pub fn root_id(&self) -> BlockId {
        self.root
    }

    /// The root block
    pub fn root(&self) -> &Block {
        &self.arena.nodes[self.root.0].block
    }

    /// Hash of the root block, fixed for the tree's lifetime
    pub fn root_hash(&self) -> &str {
        &self.root_hash
    }

    /// Deepest block; the earliest attached wins ties
    pub fn tip(&self) -> BlockId {
        self.tip
    }

    /// Arena slot for `id`
    pub fn get(&self, id: BlockId) -> Option<&TreeNode> {
        self.arena.get(id)
    }

    /// Children of `id` in attachment order (empty for unknown ids)
    pub fn children(&self, id: BlockId) -> &[BlockId] {
        self.arena
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a block by its hash
    pub fn find_by_hash(&self, hash: &str) -> Option<BlockId> {
        self.by_hash.get(hash).copied()
    }

    /// Root of the tree containing `id`
    pub fn find_root_node(&self, id: BlockId) -> Option<BlockId> {
        find_root_node(self, id)
    }

    /// Ids from `id` up to the root, leaf first
    pub fn path_to_root(&self, id: BlockId) -> Vec<BlockId> {
        path_to_root(self, id)
    }

    /// All slots in attachment order
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &TreeNode)> {
        self.arena
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (BlockId(i), node))
    }

    /// Copy of the tree as an untrusted view with the same ids
    pub fn snapshot(&self) -> PeerTree {
        PeerTree {
            arena: self.arena.clone(),
        }
    }
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new(&GenesisConfig::default())
    }
}

impl ChainSource for BlockTree {
    fn block(&self, id: BlockId) -> Option<&Block> {
        self.arena.get(id).map(|node| &node.block)
    }

    fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    fn len(&self) -> usize {
        self.arena.nodes.len()
    }
}

/// An untrusted view of a peer's blocks.
///
/// Anything can be pushed under any existing node; nothing here is checked.
/// Chains taken from a peer view must pass the
/// [`ChainValidator`](super::ChainValidator) before they reach a tree.
#[derive(Clone, Debug, Default)]
pub struct PeerTree {
    arena: Arena,
}

impl PeerTree {
    /// View holding a single root
    pub fn new(root: Block) -> Self {
        let mut arena = Arena::default();
        arena.nodes.push(TreeNode {
            block: root,
            parent: None,
            children: Vec::new(),
        });
        Self { arena }
    }

    /// Linear view built from root-first blocks; returns the leaf id
    pub fn from_chain(blocks: impl IntoIterator<Item = Block>) -> TreeResult<(Self, BlockId)> {
        let mut view = Self::default();
        let mut last = None;
        for block in blocks {
            last = Some(view.arena.push(last, block)?);
        }
        let leaf = last.ok_or(ChainRejection::EmptyChain)?;
        Ok((view, leaf))
    }

    /// Add another root
    pub fn push_root(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.arena.nodes.len());
        self.arena.nodes.push(TreeNode {
            block,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Add `block` under `parent` without any check
    pub fn push(&mut self, parent: BlockId, block: Block) -> TreeResult<BlockId> {
        self.arena.push(Some(parent), block)
    }

    /// Mutable access, for tampering with a view
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.arena.nodes.get_mut(id.0).map(|node| &mut node.block)
    }

    /// Children of `id` in insertion order
    pub fn children(&self, id: BlockId) -> &[BlockId] {
        self.arena
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }
}

impl ChainSource for PeerTree {
    fn block(&self, id: BlockId) -> Option<&Block> {
        self.arena.get(id).map(|node| &node.block)
    }

    fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.arena.get(id).and_then(|node| node.parent)
    }

    fn len(&self) -> usize {
        self.arena.nodes.len()
    }
}
