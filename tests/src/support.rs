//! Fixtures shared by the integration flows

use pt_tree_consensus::adapters::{InMemoryEventPublisher, InMemoryPeerRegistry};
use pt_tree_consensus::ports::{BlockTreeApi, ParentSelector, SystemTimeSource, TimeSource};
use pt_tree_consensus::{
    BlockId, BlockTreeService, ChainSource, ChainValidator, GenesisConfig, PeerId, PowConfig,
    Post, TreeConfig, TreeDependencies,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

/// Service type used by every flow
pub type Node = BlockTreeService<InMemoryEventPublisher, InMemoryPeerRegistry>;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary.
///
/// Respects `RUST_LOG`; silent by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Clock shared by all nodes of a test, strictly increasing
pub struct SteppingClock {
    now: AtomicU64,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            now: AtomicU64::new(SystemTimeSource.now_millis()),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SteppingClock {
    fn now_millis(&self) -> u64 {
        self.now.fetch_add(1, Ordering::SeqCst)
    }
}

/// Low-difficulty configuration that keeps searches short
pub fn fast_config() -> TreeConfig {
    TreeConfig {
        pow: PowConfig::with_difficulty(2),
        ..Default::default()
    }
}

/// Configuration whose root differs from every [`fast_config`] node
pub fn foreign_config() -> TreeConfig {
    TreeConfig {
        genesis: GenesisConfig {
            content: "a different beginning".into(),
            ..Default::default()
        },
        ..fast_config()
    }
}

/// Build a node with its own event log and peer registry
pub fn node(config: TreeConfig, clock: Arc<SteppingClock>) -> Node {
    node_with_events(config, clock).0
}

/// Build a node and keep a handle on its event log
pub fn node_with_events(
    config: TreeConfig,
    clock: Arc<SteppingClock>,
) -> (Node, Arc<InMemoryEventPublisher>) {
    init_tracing();
    let events = Arc::new(InMemoryEventPublisher::new());
    let node = BlockTreeService::new(TreeDependencies {
        events: Arc::clone(&events),
        peers: Arc::new(InMemoryPeerRegistry::new()),
        config,
    })
    .expect("test config is valid")
    .with_time_source(clock);
    (node, events)
}

/// Two nodes sharing a clock and a root, each registered with the other
pub fn node_pair() -> (Node, Node) {
    let clock = Arc::new(SteppingClock::new());
    let alice = node(fast_config(), Arc::clone(&clock));
    let bob = node(fast_config(), clock);
    alice.register_peer(PeerId::new("bob"));
    bob.register_peer(PeerId::new("alice"));
    (alice, bob)
}

/// Mine `posts` one after another at the node's tip; returns the last id
pub async fn mine_linear(node: &Node, posts: &[&str]) -> BlockId {
    let mut last = node.tip().await;
    for content in posts {
        last = node
            .propose_post(Post::new(*content), ParentSelector::Tip)
            .await
            .expect("mining at test difficulty succeeds")
            .id;
    }
    last
}

/// Assert that every non-root block of `node` links to its parent by hash
/// and carries a valid proof
pub fn assert_tree_consistent(node: &Node) {
    let validator = ChainValidator::new(node.root_hash(), node.pow().clone());
    node.with_tree(|tree| {
        for (id, entry) in tree.iter() {
            let Some(parent) = entry.parent else {
                assert_eq!(id, tree.root_id());
                continue;
            };
            let parent_block = tree.block(parent).expect("parent is stored");
            assert_eq!(entry.block.previous_hash, parent_block.hash());
            assert!(node
                .pow()
                .valid_proof(&parent_block.proof, &entry.block.proof));
            assert!(validator.valid_chain(tree, id).is_ok());
        }
    });
}

/// Content of the posts under `id`, in attachment order
pub async fn child_contents(node: &Node, id: BlockId) -> Vec<String> {
    let mut contents = Vec::new();
    for child in node.children(id).await {
        if let Some(block) = node.get_block(child).await {
            contents.push(block.post.content);
        }
    }
    contents
}

/// Number of blocks stored by `node`
pub fn block_count(node: &Node) -> usize {
    node.with_tree(|tree| tree.len())
}
