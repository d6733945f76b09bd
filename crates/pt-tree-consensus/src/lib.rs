//! # pt-tree-consensus
//!
//! Tree-consensus engine for Post-Tree.
//!
//! ## Architecture
//!
//! Posts are stored as blocks in a tree rather than a single chain. Every
//! block commits to its parent by hash and carries a proof-of-work nonce
//! derived from its parent's proof. Nodes exchange chains (root to leaf
//! paths); a receiving node validates a chain from leaf to root and splices
//! the part it has not seen under the deepest block both sides share.
//!
//! ```text
//!  propose_post ──→ [ProofOfWork] ──→ ┐
//!                   (blocking pool)    │
//!                                      ↓
//!                               [BlockTree] ← single write lock
//!                                      ↑
//!  submit_chain ──→ [ChainValidator] ──┘ via [TreeMerger]
//!                                      │
//!                                      └──→ EventPublisher (after unlock)
//! ```
//!
//! ### Trust boundary
//!
//! Peer data arrives as a [`PeerTree`](domain::PeerTree), which accepts
//! anything. Only a [`ValidatedChain`](domain::ValidatedChain), which only
//! the validator can produce, is allowed into a [`BlockTree`](domain::BlockTree).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pt_tree_consensus::{BlockTreeService, TreeConfig, TreeDependencies};
//! use pt_tree_consensus::adapters::{InMemoryEventPublisher, InMemoryPeerRegistry};
//! use pt_tree_consensus::ports::{BlockTreeApi, ParentSelector};
//!
//! let service = BlockTreeService::new(TreeDependencies {
//!     events: Arc::new(InMemoryEventPublisher::new()),
//!     peers: Arc::new(InMemoryPeerRegistry::new()),
//!     config: TreeConfig::default(),
//! })?;
//!
//! let receipt = service.propose_post(Post::new("hello"), ParentSelector::Tip).await?;
//! let outcome = other.submit_chain(&service.snapshot(), receipt.id, None).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod utils;

// Re-export main types
pub use adapters::{InMemoryEventPublisher, InMemoryPeerRegistry};
pub use config::{GenesisConfig, MiningConfig, PowConfig, TreeConfig};
pub use domain::{
    Block, BlockId, BlockTree, ChainSource, ChainValidator, MergeOutcome, MinedProof, PeerId,
    PeerTree, Post, ProofOfWork, TreeMerger, ValidatedChain,
};
pub use error::{ChainRejection, MiningError, RejectionKind, TreeError, TreeResult};
pub use events::TreeEvent;
pub use ports::{BlockTreeApi, EventPublisher, ParentSelector, PeerRegistry, ProposalReceipt};
pub use service::{BlockTreeService, TreeDependencies};
